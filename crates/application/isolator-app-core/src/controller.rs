use std::future::Future;
use std::sync::Arc;

use isolator_core::{
    archive_stem, check_profile_name, validate_profile_name, ActionKind, CreateProfileRequest, ImportReceipt,
    ProfileArchive, ProfileStatusReport, ValidationError,
};
use isolator_infra::ApiError;
use tracing::{debug, info, warn};

use crate::action_lock::ActionLock;
use crate::app_core::{ProfileStore, SessionCommand};
use crate::confirm::{ConfirmationGate, GateBusy};
use crate::domain::SessionConfig;
use crate::notifications::NotificationQueue;
use crate::polling::PollingScheduler;
use crate::ports::{ExportNavigator, ProfilesBackend};
use crate::viewmodel::DashboardVm;

pub const STATUS_FAILED_MESSAGE: &str = "Failed to fetch profile status";

/// Why a session operation did not complete.
///
/// Every variant except `Busy` and `Cancelled` has already been reported to
/// the operator through the notification queue.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("an action on profile \"{name}\" is already in progress")]
    Busy { name: String },
    #[error("confirmation declined")]
    Cancelled,
    #[error(transparent)]
    ConfirmationPending(#[from] GateBusy),
    /// Non-2xx from the backend.
    #[error("{message}")]
    Application { status: u16, message: String },
    /// No usable response from the backend.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ActionError {
    fn from_api(err: ApiError, message: String) -> Self {
        match err {
            ApiError::Application { status, .. } => ActionError::Application { status, message },
            other => ActionError::Transport {
                message,
                source: other,
            },
        }
    }
}

/// Owns the state of one dashboard session and runs every operator intent.
pub struct SessionController<B, N> {
    backend: Arc<B>,
    navigator: N,
    store: ProfileStore,
    lock: ActionLock,
    gate: ConfirmationGate,
    notifications: NotificationQueue,
    poller: Arc<PollingScheduler<B>>,
}

impl<B, N> SessionController<B, N>
where
    B: ProfilesBackend,
    N: ExportNavigator,
{
    pub fn new(backend: B, navigator: N, config: SessionConfig) -> Self {
        let backend = Arc::new(backend);
        let store = ProfileStore::new();
        let notifications =
            NotificationQueue::new(config.notification_ttl, config.max_notifications);
        let poller = Arc::new(PollingScheduler::new(
            backend.clone(),
            store.clone(),
            notifications.clone(),
            config.poll_interval,
        ));

        Self {
            backend,
            navigator,
            store,
            lock: ActionLock::new(),
            gate: ConfirmationGate::new(),
            notifications,
            poller,
        }
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn confirmation(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub fn action_lock(&self) -> &ActionLock {
        &self.lock
    }

    pub fn poller(&self) -> &Arc<PollingScheduler<B>> {
        &self.poller
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn start_polling(&self) -> bool {
        self.poller.start()
    }

    pub fn stop_polling(&self) {
        self.poller.stop();
    }

    pub fn view(&self) -> DashboardVm {
        DashboardVm::build(
            &self.store.snapshot(),
            &self.lock,
            self.notifications.snapshot(),
            self.gate.current(),
        )
    }

    pub async fn dispatch(&self, command: SessionCommand) -> Result<(), ActionError> {
        match command {
            SessionCommand::Refresh => {
                self.poller.refresh_now().await;
                Ok(())
            }
            SessionCommand::Create { name, location } => {
                self.create(&name, location.as_deref()).await
            }
            SessionCommand::Start(name) => self.start(&name).await,
            SessionCommand::Stop(name) => self.stop(&name).await,
            SessionCommand::Delete(name) => self.delete(&name).await,
            SessionCommand::Export(name) => self.export(&name),
            SessionCommand::Import(archive) => self.import(archive).await.map(|_| ()),
        }
    }

    pub async fn create(&self, name: &str, location: Option<&str>) -> Result<(), ActionError> {
        let name = self.validated(validate_profile_name(name))?;
        let request = CreateProfileRequest {
            name: name.clone(),
            location: location
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        };

        let call = self.backend.create_profile(&request);
        self.run_action(&name, ActionKind::Create, call, |_| {
            ActionKind::Create.success_message(&name)
        })
        .await
    }

    pub async fn start(&self, name: &str) -> Result<(), ActionError> {
        let name = self.validated(check_profile_name(name))?;
        if self.store.find(name).is_some_and(|p| p.status.is_running()) {
            debug!("{name} is already reported running; asking the backend anyway");
        }
        let call = self.backend.start_profile(name);
        self.run_action(name, ActionKind::Start, call, |_| {
            ActionKind::Start.success_message(name)
        })
        .await
    }

    pub async fn stop(&self, name: &str) -> Result<(), ActionError> {
        let name = self.validated(check_profile_name(name))?;
        if self.store.find(name).is_some_and(|p| !p.status.is_running()) {
            debug!("{name} is not reported running; asking the backend anyway");
        }
        let call = self.backend.stop_profile(name);
        self.run_action(name, ActionKind::Stop, call, |_| {
            ActionKind::Stop.success_message(name)
        })
        .await
    }

    /// Asks for confirmation first; declining returns [`ActionError::Cancelled`].
    pub async fn delete(&self, name: &str) -> Result<(), ActionError> {
        let name = self.validated(check_profile_name(name))?;
        let call = self.backend.delete_profile(name);
        self.run_action(name, ActionKind::Delete, call, |_| {
            ActionKind::Delete.success_message(name)
        })
        .await
    }

    /// Hand the export URL to the navigator. Not locked, not followed by a refresh.
    pub fn export(&self, name: &str) -> Result<(), ActionError> {
        let name = self.validated(check_profile_name(name))?;
        let url = self.backend.export_url(name);
        info!("exporting {name} via {url}");
        self.navigator.navigate(&url);
        Ok(())
    }

    /// Upload an archive. Locked under the archive's file stem, which is the
    /// name the backend falls back to.
    pub async fn import(&self, archive: ProfileArchive) -> Result<ImportReceipt, ActionError> {
        let stem = self.validated(archive_stem(&archive.file_name))?;
        let call = self.backend.import_profile(&archive);
        self.run_action(&stem, ActionKind::Import, call, |receipt: &ImportReceipt| {
            receipt.message.clone().unwrap_or_else(|| {
                ActionKind::Import.success_message(receipt.name.as_deref().unwrap_or(&stem))
            })
        })
        .await
    }

    /// Read-only status query for a single profile.
    pub async fn status(&self, name: &str) -> Result<ProfileStatusReport, ActionError> {
        let name = self.validated(check_profile_name(name))?;
        match self.backend.profile_status(name).await {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!("status of {name} failed: {err}");
                let message = err.user_message(STATUS_FAILED_MESSAGE);
                self.notifications.error(message.clone());
                Err(ActionError::from_api(err, message))
            }
        }
    }

    fn validated<T>(&self, res: Result<T, ValidationError>) -> Result<T, ActionError> {
        res.map_err(|e| {
            self.notifications.error(e.to_string());
            ActionError::Validation(e)
        })
    }

    /// Lock, confirm if destructive, call, report, refresh, unlock.
    ///
    /// `call` is not polled unless the lock is taken and any confirmation
    /// was accepted.
    async fn run_action<T>(
        &self,
        name: &str,
        kind: ActionKind,
        call: impl Future<Output = Result<T, ApiError>>,
        success_message: impl FnOnce(&T) -> String,
    ) -> Result<T, ActionError> {
        let Some(_guard) = self.lock.guard(name, kind) else {
            debug!("{} of {name} skipped: another action is in progress", kind.verb());
            return Err(ActionError::Busy {
                name: name.to_string(),
            });
        };

        if let Some((title, message)) = kind.confirmation(name) {
            match self.gate.request(title, message).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("{} of {name} declined", kind.verb());
                    return Err(ActionError::Cancelled);
                }
                Err(busy) => {
                    self.notifications.error("Another confirmation is already pending");
                    return Err(busy.into());
                }
            }
        }

        match call.await {
            Ok(value) => {
                self.notifications.success(success_message(&value));
                self.poller.refresh_now().await;
                Ok(value)
            }
            Err(err) => {
                warn!("{} of {name} failed: {err}", kind.verb());
                let message = err.user_message(&kind.failure_message());
                self.notifications.error(message.clone());
                Err(ActionError::from_api(err, message))
            }
        }
    }
}
