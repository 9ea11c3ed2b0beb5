//! Shared helpers.

pub mod validation;

pub use validation::JsonObject;
