//! Domain types for the gateway.
//!
//! These are pure data types with no transport dependencies. Backend wire
//! records live here too because the relay and accumulator consume them
//! without caring which adapter produced them.

pub mod chat;
pub mod embedding;
pub mod pull;
pub mod request;

pub use chat::{ChatRequest, GenerateChunk, GenerateRequest, Message, StreamEvent};
pub use embedding::{EmbeddingVector, Precision, ProviderKind, ProviderRoute, VectorData};
pub use pull::PullProgress;
pub use request::{CallLlmRequest, EmbedTextRequest, GenerateTextRequest, PullModelRequest};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// One decoded record of a backend NDJSON stream.
///
/// Implemented by every record type the backend streams back, so that the
/// decoder, accumulator and relay stay generic over chat, generate and pull
/// streams.
pub trait StreamRecord: DeserializeOwned + Serialize + Send + 'static {
    /// Whether this record closes the stream (`done: true`, `status: "success"`).
    fn is_terminal(&self) -> bool;

    /// Text fragment carried by this record, if any. Always a delta.
    fn content_delta(&self) -> Option<&str> {
        None
    }

    /// Error reported in-band by the backend (`{"error": "..."}` lines).
    fn upstream_error(&self) -> Option<&str> {
        None
    }
}
