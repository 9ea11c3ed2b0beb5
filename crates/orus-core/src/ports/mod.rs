//! Port definitions (trait abstractions) for external systems.
//!
//! Ports decouple the services from the concrete backend client, the
//! embedding library and the HTTP response writer. Adapters implement them;
//! tests substitute fakes and mocks.

pub mod backend;
pub mod embedder;
pub mod frame_sink;

pub use backend::{BackendError, InferenceBackendPort, RecordStream};
pub use embedder::{Embedder, EmbedderError, UnavailableEmbedder};
pub use frame_sink::{ErrorFrame, FrameSink, RelayFrame, SinkClosed, SummaryFrame};

#[cfg(test)]
pub use embedder::MockEmbedder;
