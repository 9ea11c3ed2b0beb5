#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tower as _;

// Used by main.rs binary
use dotenvy as _;
use serde_json as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{AppContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
