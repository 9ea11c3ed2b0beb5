//! Application services.
//!
//! Services compose the ports into the gateway's operations. They hold only
//! `Arc`s and copyable settings, so cloning them per request is cheap and
//! there is no shared mutable state.

pub mod accumulator;
pub mod chat;
pub mod dispatcher;
pub mod embedding;
pub mod models;
pub mod provider_selector;
pub mod relay;

pub use accumulator::ChatAccumulator;
pub use chat::{ChatCompletion, ChatService};
pub use dispatcher::{DispatchResult, RequestDispatcher};
pub use embedding::{EmbeddingOutcome, EmbeddingService};
pub use models::ModelService;
pub use provider_selector::ProviderSelector;
pub use relay::{RelayOptions, RelayOutcome, StreamRelay};
