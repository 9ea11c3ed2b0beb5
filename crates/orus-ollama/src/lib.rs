#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod models;
pub mod ndjson;

pub use client::OllamaClient;
pub use config::OllamaClientConfig;
pub use error::{OllamaError, OllamaResult};
pub use ndjson::decode_ndjson;

// Used by the integration tests only.
#[cfg(test)]
use axum as _;
