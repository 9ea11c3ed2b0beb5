//! Ollama wire types for the non-streaming endpoints.
//!
//! Streaming record types (`StreamEvent`, `GenerateChunk`, `PullProgress`)
//! live in `orus-core` because the relay consumes them directly.

use serde::{Deserialize, Serialize};

/// `POST /api/embeddings` request.
#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingsRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
}

/// `POST /api/embeddings` response.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingsResponse {
    #[serde(default)]
    pub embedding: Vec<f64>,
}

/// `POST /api/pull` request.
#[derive(Debug, Serialize)]
pub(crate) struct PullRequest<'a> {
    pub name: &'a str,
    pub stream: bool,
}

/// `GET /api/tags` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagModel {
    pub name: String,
}

/// Error body Ollama sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
