//! Gateway error taxonomy.
//!
//! `GatewayError` is what services return and what adapters map to HTTP
//! statuses and error frames. Backend and embedder failures keep their own
//! port-level enums and are wrapped here.

use std::time::Duration;

use thiserror::Error;

use crate::ports::{BackendError, EmbedderError};

/// Problems with a client request body, detected before any backend work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body is not JSON, or not a JSON object.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("field '{0}' must not be empty")]
    EmptyField(String),
}

impl ValidationError {
    pub fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
        }
    }
}

/// Request-level failure, local to one request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Embedding model id not present in the provider table.
    #[error("invalid model '{0}'")]
    InvalidModel(String),

    #[error(transparent)]
    Upstream(#[from] BackendError),

    #[error("embedding failed: {0}")]
    Embedder(#[from] EmbedderError),

    #[error("gateway timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The response writer cannot flush frames incrementally.
    #[error("streaming not supported")]
    StreamingUnsupported,

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Stable machine-readable code, used as `type` in error bodies and
    /// `kind` in error frames.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidModel(_) => "invalid_model",
            Self::Upstream(_) | Self::Embedder(_) => "upstream_error",
            Self::Timeout(_) => "timeout",
            Self::StreamingUnsupported => "streaming_not_supported",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status an adapter should use for this error.
    pub const fn suggested_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidModel(_) => 400,
            Self::Upstream(_) | Self::Embedder(_) => 502,
            Self::Timeout(_) => 504,
            Self::StreamingUnsupported => 406,
            Self::Internal(_) => 500,
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
