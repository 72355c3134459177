//! Central configuration constants for runtime limits and defaults.

/// Backend origin used when no `--url` / `ISOLATOR_URL` is given.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default period between profile list polls (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Minimum allowed poll period (milliseconds).
pub const MIN_POLL_INTERVAL_MS: u64 = 500;

/// Maximum allowed poll period (milliseconds). One minute.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// How long a notification stays visible before it expires (milliseconds).
pub const NOTIFICATION_TTL_MS: u64 = 4_000;

/// Upper bound on simultaneously held notifications. The oldest is dropped first.
pub const MAX_NOTIFICATIONS: usize = 20;

/// Per-request timeout for backend calls (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Convenience function to clamp a poll interval into allowed range.
pub fn clamp_poll_interval_ms(v: u64) -> u64 {
    v.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS)
}
