//! Axum-specific error type and its mapping to HTTP responses.
//!
//! Failures keep the envelope shape (`success: false`) and add the HTTP
//! `status` and a stable `type` code taken from `GatewayError::kind`.

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orus_core::{GatewayError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::dto::elapsed_nanos;

/// A request failure on its way to the client.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct HttpError {
    error: GatewayError,
    time_taken: u64,
}

impl HttpError {
    /// Record how long the request ran before failing.
    #[must_use]
    pub fn since(mut self, started: Instant) -> Self {
        self.time_taken = elapsed_nanos(started);
        self
    }

    pub const fn gateway_error(&self) -> &GatewayError {
        &self.error
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.suggested_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<GatewayError> for HttpError {
    fn from(error: GatewayError) -> Self {
        Self {
            error,
            time_taken: 0,
        }
    }
}

impl From<ValidationError> for HttpError {
    fn from(error: ValidationError) -> Self {
        GatewayError::from(error).into()
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    serial: String,
    message: &'static str,
    error: String,
    data: Option<()>,
    time_taken: u64,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(rename = "type")]
    error_type: &'static str,
}

/// Short human summary per error kind.
const fn summary(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::Validation(_) => "Invalid request",
        GatewayError::InvalidModel(_) => "Invalid model",
        GatewayError::Upstream(_) => "Error calling Ollama",
        GatewayError::Embedder(_) => "Error embedding text",
        GatewayError::Timeout(_) => "Error Timeout",
        GatewayError::StreamingUnsupported => "Streaming not supported",
        GatewayError::Internal(_) => "Internal error",
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            serial: Uuid::new_v4().to_string(),
            message: summary(&self.error),
            error: self.error.to_string(),
            data: None,
            time_taken: self.time_taken,
            status: status.as_u16(),
            error_type: self.error.kind(),
        };

        (status, axum::Json(body)).into_response()
    }
}
