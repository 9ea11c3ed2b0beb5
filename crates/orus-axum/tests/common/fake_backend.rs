//! Scripted in-memory backend for route tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use orus_core::{
    BackendError, ChatRequest, Embedder, EmbedderError, GenerateChunk, GenerateRequest,
    InferenceBackendPort, PullProgress, RecordStream, StreamEvent,
};
use tokio_util::sync::CancellationToken;

/// Backend whose every answer is fixed up front.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub chat: Vec<Result<StreamEvent, BackendError>>,
    pub generate: Vec<Result<GenerateChunk, BackendError>>,
    pub pull: Vec<Result<PullProgress, BackendError>>,
    pub embedding: Vec<f64>,
    pub models: Vec<String>,
    /// Returned instead of any stream or value.
    pub open_error: Option<BackendError>,
    /// Delay before a call answers.
    pub latency: Duration,
    /// Streams stall forever after their scripted records.
    pub stall: bool,
    pub seen_chat: Mutex<Vec<ChatRequest>>,
    pub seen_embed: Mutex<Vec<String>>,
    pub seen_cancel: Mutex<Option<CancellationToken>>,
}

impl FakeBackend {
    /// Chat answering "Hel" then "lo".
    pub fn hello() -> Self {
        Self {
            chat: vec![
                Ok(StreamEvent::delta("llama3", "Hel", false)),
                Ok(StreamEvent::delta("llama3", "lo", true)),
            ],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn stalling(mut self) -> Self {
        self.stall = true;
        self
    }

    async fn open<T: Clone + Send + 'static>(
        &self,
        records: &[Result<T, BackendError>],
        cancel: CancellationToken,
    ) -> Result<RecordStream<T>, BackendError> {
        tokio::time::sleep(self.latency).await;
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        *self.seen_cancel.lock().unwrap() = Some(cancel);

        let scripted = stream::iter(records.to_vec());
        if self.stall {
            Ok(Box::pin(scripted.chain(stream::pending())))
        } else {
            Ok(Box::pin(scripted))
        }
    }
}

#[async_trait]
impl InferenceBackendPort for FakeBackend {
    async fn chat(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> Result<RecordStream<StreamEvent>, BackendError> {
        self.seen_chat.lock().unwrap().push(request.clone());
        self.open(&self.chat, cancel).await
    }

    async fn generate(
        &self,
        _request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<RecordStream<GenerateChunk>, BackendError> {
        self.open(&self.generate, cancel).await
    }

    async fn pull_model(
        &self,
        _name: &str,
        cancel: CancellationToken,
    ) -> Result<RecordStream<PullProgress>, BackendError> {
        self.open(&self.pull, cancel).await
    }

    async fn embed(
        &self,
        model: &str,
        _text: &str,
        _cancel: CancellationToken,
    ) -> Result<Vec<f64>, BackendError> {
        tokio::time::sleep(self.latency).await;
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.seen_embed.lock().unwrap().push(model.to_string());
        Ok(self.embedding.clone())
    }

    async fn list_models(&self, _cancel: CancellationToken) -> Result<Vec<String>, BackendError> {
        tokio::time::sleep(self.latency).await;
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        Ok(self.models.clone())
    }
}

/// In-process embedder whose vector encodes the input, so tests can tell
/// requests apart.
#[derive(Debug, Default)]
pub struct EchoEmbedder;

impl Embedder for EchoEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        if text.is_empty() {
            return Err(EmbedderError::Failed("empty input".into()));
        }
        Ok(text.bytes().map(f32::from).collect())
    }
}
