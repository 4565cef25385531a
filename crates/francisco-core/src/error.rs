use thiserror::Error;

#[derive(Debug, Error)]
pub enum FranciscoError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Failure talking to the chat-completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The API answered with a non-2xx status; the code is relayed to callers.
    #[error("completion API returned status {status}")]
    Upstream { status: u16 },

    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("could not decode completion response: {0}")]
    Decode(String),
}

impl CompletionError {
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CompletionError::Upstream { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, FranciscoError>;
