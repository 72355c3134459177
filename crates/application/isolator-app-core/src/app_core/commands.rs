use isolator_core::{ProfileArchive, ProfileName};

/// Intents the render layer dispatches into the session controller.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Refresh,

    // Lifecycle
    Create {
        name: String,
        location: Option<String>,
    },
    Start(ProfileName),
    Stop(ProfileName),
    Delete(ProfileName),

    // Archives
    Export(ProfileName),
    Import(ProfileArchive),
}
