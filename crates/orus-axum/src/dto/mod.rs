//! Data Transfer Objects (DTOs) for the HTTP API contract.
//!
//! These types fix the JSON field names clients see and keep core domain
//! types free of envelope concerns.

pub mod envelope;
pub mod payloads;
pub mod system;

pub use envelope::{OrusResponse, elapsed_nanos};
pub use payloads::{ChatData, EmbedData, GenerateData, ModelListData};
pub use system::SystemInfoDto;
