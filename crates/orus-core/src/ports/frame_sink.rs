//! Frame sink port for streaming responses.
//!
//! The relay writes frames through this port; the HTTP adapter decides how
//! they reach the client (SSE `data:` frames over a bounded channel).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The client went away; no further frames can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("client disconnected")]
pub struct SinkClosed;

/// Closing frame after a terminal record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryFrame {
    /// Always `"success"`.
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub serial: String,
    /// Elapsed nanoseconds since the request started.
    pub time_taken: u64,
}

/// Closing frame after a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFrame {
    /// Always `"error"`.
    pub status: &'static str,
    pub error: String,
    pub kind: &'static str,
    pub serial: String,
    pub time_taken: u64,
}

/// One outgoing stream frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayFrame {
    /// A backend record, forwarded as-is.
    Data(Value),
    Summary(SummaryFrame),
    Error(ErrorFrame),
}

impl RelayFrame {
    /// JSON payload for the frame's `data:` line.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Data(value) => value.clone(),
            Self::Summary(frame) => serde_json::to_value(frame).unwrap_or(Value::Null),
            Self::Error(frame) => serde_json::to_value(frame).unwrap_or(Value::Null),
        }
    }
}

/// Incremental frame writer.
#[async_trait]
pub trait FrameSink: Send {
    /// Whether frames written now reach the client now.
    fn supports_flush(&self) -> bool;

    /// Write and flush one frame. Waits when the client is slow.
    async fn send(&mut self, frame: RelayFrame) -> Result<(), SinkClosed>;
}
