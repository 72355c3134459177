#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use isolator_app_core::{SessionConfig, SessionController};
use isolator_core::{
    CreateProfileRequest, ImportReceipt, Profile, ProfileArchive, ProfileStatus,
    ProfileStatusReport,
};
use isolator_infra::{ApiError, ProfilesBackend};
use tokio::sync::Semaphore;

pub fn profile(name: &str, status: ProfileStatus) -> Profile {
    Profile {
        name: name.into(),
        status,
        size_mb: 120.0,
        has_desktop_entry: true,
    }
}

#[derive(Debug, Clone)]
pub enum Failure {
    Application(u16, Option<&'static str>),
    Transport,
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Failure::Application(status, message) => ApiError::Application {
                status: *status,
                message: message.map(str::to_string),
            },
            Failure::Transport => ApiError::Transport("connection refused".into()),
        }
    }
}

/// In-memory stand-in for the sandbox backend.
#[derive(Default)]
pub struct FakeBackend {
    profiles: Mutex<Vec<Profile>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, Failure>>,
    list_delays: Mutex<VecDeque<Duration>>,
    list_calls: AtomicUsize,
    list_down: AtomicBool,
    /// When set, lifecycle calls wait for a permit before answering.
    hold: Option<Arc<Semaphore>>,
}

impl FakeBackend {
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            ..Self::default()
        }
    }

    /// Lifecycle calls block until the returned semaphore gets permits.
    pub fn held(profiles: Vec<Profile>) -> (Self, Arc<Semaphore>) {
        let hold = Arc::new(Semaphore::new(0));
        let backend = Self {
            profiles: Mutex::new(profiles),
            hold: Some(hold.clone()),
            ..Self::default()
        };
        (backend, hold)
    }

    pub fn fail(&self, call: &str, failure: Failure) {
        self.failures.lock().unwrap().insert(call.to_string(), failure);
    }

    pub fn set_list_down(&self, down: bool) {
        self.list_down.store(down, Ordering::SeqCst);
    }

    pub fn push_list_delay(&self, delay: Duration) {
        self.list_delays.lock().unwrap().push_back(delay);
    }

    pub fn set_profiles(&self, profiles: Vec<Profile>) {
        *self.profiles.lock().unwrap() = profiles;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn lifecycle(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(hold) = &self.hold {
            hold.acquire().await.unwrap().forget();
        }
        match self.failures.lock().unwrap().remove(&call) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn set_status(&self, name: &str, status: ProfileStatus) {
        if let Some(p) = self
            .profiles
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.name == name)
        {
            p.status = status;
        }
    }
}

#[async_trait::async_trait]
impl ProfilesBackend for FakeBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.profiles.lock().unwrap().clone();
        let down = self.list_down.load(Ordering::SeqCst);
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if down {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(snapshot)
    }

    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<(), ApiError> {
        let call = format!(
            "create:{}:{}",
            request.name,
            request.location.as_deref().unwrap_or("-")
        );
        self.lifecycle(call).await?;
        self.profiles
            .lock()
            .unwrap()
            .push(profile(&request.name, ProfileStatus::NotFound));
        Ok(())
    }

    async fn start_profile(&self, name: &str) -> Result<(), ApiError> {
        self.lifecycle(format!("start:{name}")).await?;
        self.set_status(name, ProfileStatus::Running);
        Ok(())
    }

    async fn stop_profile(&self, name: &str) -> Result<(), ApiError> {
        self.lifecycle(format!("stop:{name}")).await?;
        self.set_status(name, ProfileStatus::Exited);
        Ok(())
    }

    async fn delete_profile(&self, name: &str) -> Result<(), ApiError> {
        self.lifecycle(format!("delete:{name}")).await?;
        self.profiles.lock().unwrap().retain(|p| p.name != name);
        Ok(())
    }

    async fn profile_status(&self, name: &str) -> Result<ProfileStatusReport, ApiError> {
        self.calls.lock().unwrap().push(format!("status:{name}"));
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .map(|p| ProfileStatusReport {
                name: p.name.clone(),
                status: p.status,
                size_mb: p.size_mb,
            })
            .ok_or(ApiError::Application {
                status: 404,
                message: Some("Profile not found".into()),
            })
    }

    async fn import_profile(&self, archive: &ProfileArchive) -> Result<ImportReceipt, ApiError> {
        self.lifecycle(format!("import:{}", archive.file_name)).await?;
        Ok(ImportReceipt {
            name: Some("restored".into()),
            path: Some("/home/op/Chrome/restored".into()),
            message: None,
        })
    }

    fn export_url(&self, name: &str) -> String {
        format!("http://backend.test/api/profiles/{name}/export")
    }
}

pub type Visited = Arc<Mutex<Vec<String>>>;

pub fn controller(
    backend: FakeBackend,
) -> (
    SessionController<FakeBackend, impl Fn(&str) + Send + Sync + 'static>,
    Visited,
) {
    let visited: Visited = Arc::default();
    let navigator = {
        let visited = visited.clone();
        move |url: &str| visited.lock().unwrap().push(url.to_string())
    };
    let controller = SessionController::new(backend, navigator, SessionConfig::default());
    (controller, visited)
}
