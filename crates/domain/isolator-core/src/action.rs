/// Lifecycle actions that go through the per-name action lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Create,
    Start,
    Stop,
    Delete,
    Import,
}

impl ActionKind {
    /// Destructive actions must be confirmed before the backend call is issued.
    pub fn is_destructive(self) -> bool {
        matches!(self, ActionKind::Delete)
    }

    /// Title and body of the confirmation prompt, for destructive actions only.
    pub fn confirmation(self, name: &str) -> Option<(String, String)> {
        self.is_destructive().then(|| {
            (
                DELETE_CONFIRM_TITLE.to_string(),
                delete_confirm_message(name),
            )
        })
    }

    pub fn verb(self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Delete => "delete",
            ActionKind::Import => "import",
        }
    }

    pub fn success_message(self, name: &str) -> String {
        match self {
            ActionKind::Create => format!("Profile \"{name}\" created successfully!"),
            ActionKind::Start => format!("Profile \"{name}\" started!"),
            ActionKind::Stop => format!("Profile \"{name}\" stopped!"),
            ActionKind::Delete => format!("Profile \"{name}\" deleted!"),
            ActionKind::Import => format!("Profile \"{name}\" imported!"),
        }
    }

    /// Used when the backend gives no message, and for transport failures.
    pub fn failure_message(self) -> String {
        format!("Failed to {} profile", self.verb())
    }
}

pub const DELETE_CONFIRM_TITLE: &str = "Delete profile";

pub fn delete_confirm_message(name: &str) -> String {
    format!(
        "Are you sure you want to delete profile \"{name}\"?\n\nThis will remove all data and cannot be undone."
    )
}
