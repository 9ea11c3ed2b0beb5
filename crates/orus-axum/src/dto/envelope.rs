//! Response envelope shared by every non-streaming route.

use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

/// Envelope returned for non-streaming calls.
#[derive(Debug, Clone, Serialize)]
pub struct OrusResponse<T> {
    pub success: bool,
    /// Fresh UUID v4 per response.
    pub serial: String,
    pub message: String,
    /// Empty on success.
    pub error: String,
    pub data: Option<T>,
    /// Elapsed nanoseconds since the request arrived.
    pub time_taken: u64,
}

impl<T: Serialize> OrusResponse<T> {
    pub fn success(message: impl Into<String>, data: T, started: Instant) -> Self {
        Self {
            success: true,
            serial: Uuid::new_v4().to_string(),
            message: message.into(),
            error: String::new(),
            data: Some(data),
            time_taken: elapsed_nanos(started),
        }
    }
}

/// Nanoseconds since `started`, saturating.
pub fn elapsed_nanos(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX)
}
