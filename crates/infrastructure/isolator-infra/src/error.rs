#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),
    /// A 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Application { status: u16, message: Option<String> },
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Transport,
    Application,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Application { .. } => ApiErrorKind::Application,
            ApiError::Transport(_)
            | ApiError::Decode(_)
            | ApiError::InvalidUrl(_)
            | ApiError::Io(_) => ApiErrorKind::Transport,
        }
    }

    /// Text to show the operator: the server's message verbatim when it sent
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Application {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}
