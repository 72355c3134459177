pub mod action_lock;
pub mod app_core;
pub mod confirm;
pub mod controller;
pub mod domain;
pub mod notifications;
pub mod polling;
pub mod ports;
pub mod viewmodel;

pub use action_lock::{ActionLock, PendingAction};
pub use app_core::*;
pub use confirm::{ConfirmationGate, ConfirmationRequest, GateBusy, Resolution};
pub use controller::{ActionError, SessionController};
pub use domain::{Notification, NotificationId, SessionConfig, Severity};
pub use notifications::NotificationQueue;
pub use polling::{PollingScheduler, RefreshOutcome};
pub use ports::*;
pub use viewmodel::*;
