#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    CallLlmRequest, ChatRequest, EmbedTextRequest, EmbeddingVector, GenerateChunk,
    GenerateRequest, GenerateTextRequest, Message, Precision, ProviderKind, ProviderRoute,
    PullModelRequest, PullProgress, StreamEvent, StreamRecord, VectorData,
};
pub use error::{GatewayError, ValidationError};
pub use ports::{
    BackendError, Embedder, EmbedderError, FrameSink, InferenceBackendPort, RecordStream,
    RelayFrame, SinkClosed, UnavailableEmbedder,
};
pub use services::{
    ChatAccumulator, ChatCompletion, ChatService, DispatchResult, EmbeddingOutcome,
    EmbeddingService, ModelService, ProviderSelector, RelayOptions, RelayOutcome,
    RequestDispatcher, StreamRelay,
};
pub use settings::{ConfigError, EmbedderPaths, GatewayConfig};
