pub mod error;
pub mod net;

// Re-exports for convenience
pub use error::{ApiError, ApiErrorKind};
pub use net::{
    default_http_client, encode_path_segment, export_file_name, HttpProfilesBackend,
    ProfilesBackend,
};
