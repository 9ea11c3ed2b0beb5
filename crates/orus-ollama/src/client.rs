//! Reqwest-based Ollama client.

use std::time::Instant;

use async_trait::async_trait;
use orus_core::{
    BackendError, ChatRequest, GenerateChunk, GenerateRequest, InferenceBackendPort,
    PullProgress, RecordStream, StreamEvent, StreamRecord,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::OllamaClientConfig;
use crate::error::{OllamaError, OllamaResult};
use crate::models::{EmbeddingsRequest, EmbeddingsResponse, ErrorBody, PullRequest, TagsResponse};
use crate::ndjson::decode_ndjson;

/// Ollama HTTP client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(config: OllamaClientConfig) -> OllamaResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request, racing it against `cancel`, and check the status.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> OllamaResult<reqwest::Response> {
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(OllamaError::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        // Prefer Ollama's `{"error": "..."}` message over the raw body.
        let body = serde_json::from_str::<ErrorBody>(&body).map_or(body, |e| e.error);
        warn!(status = status.as_u16(), error = %body, "Ollama returned an error status");
        Err(OllamaError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// POST a JSON body and decode the NDJSON response lazily.
    async fn post_stream<B, T>(
        &self,
        path: &str,
        body: &B,
        cancel: CancellationToken,
    ) -> OllamaResult<RecordStream<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: StreamRecord,
    {
        let started = Instant::now();
        let request = self.http.post(self.url(path)).json(body);
        let response = self.send(request, &cancel).await?;
        debug!(
            path,
            elapsed_ms = started.elapsed().as_millis(),
            "Ollama stream opened"
        );
        Ok(decode_ndjson(response.bytes_stream(), cancel))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> OllamaResult<T> {
        let response = self.send(request, cancel).await?;
        let bytes = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(OllamaError::Cancelled),
            bytes = response.bytes() => bytes?,
        };
        serde_json::from_slice(&bytes).map_err(|e| OllamaError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl InferenceBackendPort for OllamaClient {
    async fn chat(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> Result<RecordStream<StreamEvent>, BackendError> {
        Ok(self.post_stream("/api/chat", request, cancel).await?)
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<RecordStream<GenerateChunk>, BackendError> {
        Ok(self.post_stream("/api/generate", request, cancel).await?)
    }

    async fn pull_model(
        &self,
        name: &str,
        cancel: CancellationToken,
    ) -> Result<RecordStream<PullProgress>, BackendError> {
        let body = PullRequest { name, stream: true };
        Ok(self.post_stream("/api/pull", &body, cancel).await?)
    }

    async fn embed(
        &self,
        model: &str,
        text: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<f64>, BackendError> {
        let body = EmbeddingsRequest {
            model,
            prompt: text,
        };
        let request = self.http.post(self.url("/api/embeddings")).json(&body);
        let response: EmbeddingsResponse = self.json(request, &cancel).await?;
        Ok(response.embedding)
    }

    async fn list_models(&self, cancel: CancellationToken) -> Result<Vec<String>, BackendError> {
        let request = self.http.get(self.url("/api/tags"));
        let tags: TagsResponse = self.json(request, &cancel).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}
