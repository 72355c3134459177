use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{Notification, NotificationId, Severity};

/// Transient feedback shown to the operator.
///
/// Every entry gets its own expiry timer; entries can also be dismissed early.
/// When a cap is configured the oldest entry is dropped to make room.
#[derive(Clone)]
pub struct NotificationQueue {
    entries: Arc<watch::Sender<Vec<Notification>>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
    cap: Option<usize>,
}

impl NotificationQueue {
    pub fn new(ttl: Duration, cap: Option<usize>) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            entries: Arc::new(tx),
            next_id: Arc::new(AtomicU64::new(0)),
            ttl,
            cap: cap.filter(|c| *c > 0),
        }
    }

    /// Append a notification and schedule its removal.
    ///
    /// Expiry needs a tokio runtime; without one the entry stays until dismissed.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let message = message.into();
        match severity {
            Severity::Success => info!("{message}"),
            Severity::Error => warn!("{message}"),
        }

        let entry = Notification {
            id,
            message,
            severity,
            created_at: Utc::now(),
        };
        let cap = self.cap;
        self.entries.send_modify(|entries| {
            entries.push(entry);
            if let Some(cap) = cap {
                while entries.len() > cap {
                    let dropped = entries.remove(0);
                    debug!("notification {:?} dropped to respect cap {cap}", dropped.id);
                }
            }
        });

        self.schedule_expiry(id);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, Severity::Error)
    }

    /// Remove a notification now. Returns false if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        remove_entry(&self.entries, id)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.entries.subscribe()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn schedule_expiry(&self, id: NotificationId) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime: notification {id:?} will not expire");
            return;
        };

        let entries: Weak<watch::Sender<Vec<Notification>>> = Arc::downgrade(&self.entries);
        let ttl = self.ttl;
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(entries) = entries.upgrade() {
                if remove_entry(&entries, id) {
                    debug!("notification {id:?} expired");
                }
            }
        });
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(isolator_config::NOTIFICATION_TTL_MS),
            Some(isolator_config::MAX_NOTIFICATIONS),
        )
    }
}

fn remove_entry(entries: &watch::Sender<Vec<Notification>>, id: NotificationId) -> bool {
    entries.send_if_modified(|entries| {
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    })
}
