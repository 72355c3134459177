use std::time::Duration;

use chrono::{DateTime, Utc};

/// Runtime knobs of a dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub notification_ttl: Duration,
    /// `None` keeps every notification until it expires.
    pub max_notifications: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(isolator_config::DEFAULT_POLL_INTERVAL_MS),
            notification_ttl: Duration::from_millis(isolator_config::NOTIFICATION_TTL_MS),
            max_notifications: Some(isolator_config::MAX_NOTIFICATIONS),
        }
    }
}

impl SessionConfig {
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval = Duration::from_millis(isolator_config::clamp_poll_interval_ms(ms));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}
