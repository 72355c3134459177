use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::app_core::store::{ApplyOutcome, ProfileStore};
use crate::notifications::NotificationQueue;
use crate::ports::ProfilesBackend;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load profiles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The store now holds the fetched list.
    Replaced,
    /// The fetched list equals what the store already had.
    Unchanged,
    /// A newer fetch had already been applied; this one was dropped.
    Stale,
    /// The fetch failed; the store was left alone.
    Failed,
}

impl From<ApplyOutcome> for RefreshOutcome {
    fn from(value: ApplyOutcome) -> Self {
        match value {
            ApplyOutcome::Replaced => RefreshOutcome::Replaced,
            ApplyOutcome::Unchanged => RefreshOutcome::Unchanged,
            ApplyOutcome::Stale => RefreshOutcome::Stale,
        }
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Keeps the [`ProfileStore`] in step with the backend.
pub struct PollingScheduler<B> {
    backend: Arc<B>,
    store: ProfileStore,
    notifications: NotificationQueue,
    period: Duration,
    last_seq: AtomicU64,
    task: Mutex<Option<PollTask>>,
}

impl<B: ProfilesBackend> PollingScheduler<B> {
    pub fn new(
        backend: Arc<B>,
        store: ProfileStore,
        notifications: NotificationQueue,
        period: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            notifications,
            period,
            last_seq: AtomicU64::new(0),
            task: Mutex::new(None),
        }
    }

    fn task(&self) -> MutexGuard<'_, Option<PollTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Begin periodic refreshes; the first one fires immediately.
    ///
    /// Returns false if polling is already running or there is no tokio
    /// runtime to run it on.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut task = self.task();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime: profile polling not started");
            return false;
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let this = Arc::downgrade(self);
        let period = self.period;

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(scheduler) = this.upgrade() else { break };
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = scheduler.refresh_now() => {}
                        }
                    }
                }
            }
            debug!("profile polling stopped");
        });

        debug!("profile polling started every {period:?}");
        *task = Some(PollTask { cancel, handle });
        true
    }

    /// Cancel the periodic task. Manual refreshes keep working.
    pub fn stop(&self) {
        if let Some(task) = self.task().take() {
            task.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task()
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled() && !t.handle.is_finished())
    }

    /// Fetch the list now, outside the periodic schedule.
    ///
    /// Overlapping refreshes may complete in any order; the store keeps the
    /// result of the most recently issued fetch that succeeded.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;
        match self.backend.list_profiles().await {
            Ok(profiles) => {
                let count = profiles.len();
                let outcome = RefreshOutcome::from(self.store.apply(seq, profiles));
                debug!("refresh #{seq}: {count} profiles, {outcome:?}");
                outcome
            }
            Err(e) => {
                warn!("refresh #{seq} failed: {e}");
                self.notifications.error(LOAD_FAILED_MESSAGE);
                RefreshOutcome::Failed
            }
        }
    }
}

impl<B> Drop for PollingScheduler<B> {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.cancel.cancel();
        }
    }
}
