//! Internal error types for Ollama operations.
//!
//! These errors are internal to `orus-ollama` and are mapped to
//! `BackendError` at the port boundary.

use orus_core::BackendError;
use thiserror::Error;

/// Result type alias for Ollama operations.
pub type OllamaResult<T> = Result<T, OllamaError>;

#[derive(Debug, Error)]
pub enum OllamaError {
    /// Network or HTTP client error, including request timeouts.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Ollama answered with a non-success status.
    #[error("error from Ollama (status {status}): {body}")]
    Status { status: u16, body: String },

    /// Ollama returned a body that is not the expected JSON.
    #[error("Invalid response from Ollama: {0}")]
    InvalidResponse(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<OllamaError> for BackendError {
    fn from(error: OllamaError) -> Self {
        match error {
            OllamaError::Network(e) if e.is_decode() => Self::Decode(e.to_string()),
            OllamaError::Network(e) => Self::Transport(e.to_string()),
            OllamaError::Status { status, body } => Self::Status { status, body },
            OllamaError::InvalidResponse(message) => Self::Decode(message),
            OllamaError::Cancelled => Self::Cancelled,
        }
    }
}
