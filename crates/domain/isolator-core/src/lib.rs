use serde::{Deserialize, Serialize};

pub mod action;
pub mod validation;

pub use action::ActionKind;
pub use validation::{archive_stem, check_profile_name, validate_profile_name, ValidationError};

pub type ProfileName = String;

/// Container state as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Running,
    Exited,
    #[default]
    NotFound,
    /// Any other state string (`created`, `paused`, ...).
    #[serde(other)]
    Unknown,
}

impl ProfileStatus {
    pub fn is_running(self) -> bool {
        matches!(self, ProfileStatus::Running)
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileStatus::Running => "Running",
            ProfileStatus::Exited => "Stopped",
            ProfileStatus::NotFound => "Not Started",
            ProfileStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub name: ProfileName,
    pub status: ProfileStatus,
    #[serde(default)]
    pub size_mb: f64,
    #[serde(default)]
    pub has_desktop_entry: bool,
}

/// Body of `GET /api/profiles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileList {
    pub profiles: Vec<Profile>,
}

/// Body of `POST /api/profiles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateProfileRequest {
    pub name: ProfileName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Body of `GET /api/profiles/{name}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileStatusReport {
    pub name: ProfileName,
    pub status: ProfileStatus,
    #[serde(default)]
    pub size_mb: f64,
}

/// Body of a successful `POST /api/profiles/import`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImportReceipt {
    #[serde(default)]
    pub name: Option<ProfileName>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// An archive selected for upload through the import endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
