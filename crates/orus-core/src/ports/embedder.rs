//! In-process embedder port.
//!
//! The numeric embedding model is an external library; the gateway only
//! knows it through `embed(text) -> vector`. Calls are blocking and are
//! run on the blocking pool by the embedding service.

use thiserror::Error;

/// Errors from the in-process embedder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedderError {
    /// No embedding library is linked into this build.
    #[error("in-process embedder is not available")]
    Unavailable,

    #[error("embedder failed: {0}")]
    Failed(String),
}

/// Blocking text embedder.
#[cfg_attr(test, mockall::automock)]
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;
}

/// Embedder used when no library is linked. Always reports unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEmbedder;

impl Embedder for UnavailableEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
        Err(EmbedderError::Unavailable)
    }
}
