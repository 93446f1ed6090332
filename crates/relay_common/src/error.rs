//! Error types for the relay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Chat API rejected the request: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    /// Whether the failure is worth retrying from the caller's side.
    /// API rejections are permanent for the same payload; transport and
    /// decode failures may clear up on their own.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Transport(_) => true,
            RelayError::Api(_) => false,
            RelayError::Json(_) => true,
        }
    }
}
