//! `data` payloads of the envelope, one per route.

use orus_core::{Message, VectorData};
use serde::Serialize;

/// `POST /embed-text`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedData {
    pub vector: VectorData,
    pub dimensions: usize,
    /// Vector precision: `"float32"` or `"float64"`.
    pub quantization: &'static str,
    pub model: String,
    pub text: String,
}

/// `GET /model-list`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelListData {
    pub models: Vec<String>,
}

/// `POST /call-llm` without streaming.
#[derive(Debug, Clone, Serialize)]
pub struct ChatData {
    pub response: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

/// `POST /generate` without streaming.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateData {
    pub response: String,
    pub model: String,
    pub prompt: String,
}
