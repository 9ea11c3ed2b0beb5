//! Inference backend port.
//!
//! This port abstracts the remote inference server (Ollama). Streaming
//! operations hand back a lazy `RecordStream` so that callers pull records
//! at their own pace; the adapter never buffers a whole response.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{ChatRequest, GenerateChunk, GenerateRequest, PullProgress, StreamEvent};

/// Lazy, order-preserving sequence of decoded backend records.
///
/// The stream yields at most one error and then ends.
pub type RecordStream<T> = Pin<Box<dyn Stream<Item = Result<T, BackendError>> + Send>>;

/// Errors reported by the inference backend or its transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Connection refused, reset, or the body read failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success HTTP status.
    #[error("error from Ollama (status {status}): {body}")]
    Status { status: u16, body: String },

    /// A line or body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Backend reported an error in-band.
    #[error("Ollama error: {0}")]
    Upstream(String),

    /// Stream ended without a terminal record.
    #[error("Incomplete stream: {0}")]
    IncompleteStream(String),

    /// The request was cancelled before completion.
    #[error("Request cancelled")]
    Cancelled,
}

impl BackendError {
    /// Machine-readable code used in SSE error frames.
    #[must_use]
    pub const fn frame_kind(&self) -> &'static str {
        match self {
            Self::IncompleteStream(_) => "incomplete_stream",
            Self::Cancelled => "cancelled",
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_) | Self::Upstream(_) => {
                "upstream_error"
            }
        }
    }
}

/// Port for the remote inference backend.
#[async_trait]
pub trait InferenceBackendPort: Send + Sync + fmt::Debug {
    /// Start a chat completion. With `request.stream == false` the stream
    /// still yields records, usually a single terminal one.
    async fn chat(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> Result<RecordStream<StreamEvent>, BackendError>;

    /// Start a prompt completion.
    async fn generate(
        &self,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<RecordStream<GenerateChunk>, BackendError>;

    /// Start pulling a model; yields progress records until `success`.
    async fn pull_model(
        &self,
        name: &str,
        cancel: CancellationToken,
    ) -> Result<RecordStream<PullProgress>, BackendError>;

    /// Compute an embedding with a backend-hosted model.
    async fn embed(
        &self,
        model: &str,
        text: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<f64>, BackendError>;

    /// Names of the models installed on the backend.
    async fn list_models(&self, cancel: CancellationToken) -> Result<Vec<String>, BackendError>;
}
