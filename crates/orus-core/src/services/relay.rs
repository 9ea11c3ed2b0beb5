//! Re-encoding of backend record streams as outgoing frames.
//!
//! One relay serves one streaming response. It forwards each record as a
//! data frame the moment it arrives, then closes with exactly one summary
//! or error frame:
//!
//! ```text
//! Idle --open--> Open --terminal record-----> ClosedNormal
//!                     --error / incomplete--> ClosedError
//!                     --idle window expired--> ClosedTimeout
//! ```

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::StreamRecord;
use crate::error::GatewayError;
use crate::ports::{
    BackendError, ErrorFrame, FrameSink, RecordStream, RelayFrame, SinkClosed, SummaryFrame,
};
use crate::services::accumulator::ChatAccumulator;
use crate::settings::DEFAULT_STREAM_IDLE_TIMEOUT;

/// Per-stream relay settings.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Longest gap allowed between two records.
    pub idle_timeout: Duration,
    /// Message carried by the summary frame.
    pub summary_message: String,
    /// Whether the summary frame carries the accumulated content.
    pub include_content: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_STREAM_IDLE_TIMEOUT,
            summary_message: "stream completed".to_string(),
            include_content: true,
        }
    }
}

impl RelayOptions {
    pub fn new(idle_timeout: Duration, summary_message: impl Into<String>) -> Self {
        Self {
            idle_timeout,
            summary_message: summary_message.into(),
            include_content: true,
        }
    }

    /// Progress streams have no text to accumulate.
    #[must_use]
    pub const fn without_content(mut self) -> Self {
        self.include_content = false;
        self
    }
}

/// How a relay ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// Terminal record seen and summary frame sent.
    Completed { content: String, frames: usize },
    /// Error frame sent after an upstream failure or incomplete stream.
    Failed(GatewayError),
    /// Idle window expired; error frame sent and upstream cancelled.
    TimedOut,
    /// Client went away; upstream cancelled.
    Disconnected,
}

/// Forwards one record stream to one frame sink.
pub struct StreamRelay<S: FrameSink> {
    sink: S,
    options: RelayOptions,
    started: Instant,
    upstream: CancellationToken,
}

impl<S: FrameSink> StreamRelay<S> {
    /// Bind a sink. Fails before anything is written if the sink cannot
    /// flush frames incrementally.
    pub fn open(sink: S, options: RelayOptions) -> Result<Self, GatewayError> {
        if !sink.supports_flush() {
            return Err(GatewayError::StreamingUnsupported);
        }
        Ok(Self {
            sink,
            options,
            started: Instant::now(),
            upstream: CancellationToken::new(),
        })
    }

    /// Measure `time_taken` from `started` instead of from `open`.
    #[must_use]
    pub const fn started_at(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Token cancelled when the relay gives up on the upstream.
    #[must_use]
    pub fn with_upstream_cancel(mut self, token: CancellationToken) -> Self {
        self.upstream = token;
        self
    }

    /// Forward `records` until a terminal record, an error, an idle
    /// timeout or a client disconnect.
    pub async fn run<R: StreamRecord>(mut self, mut records: RecordStream<R>) -> RelayOutcome {
        let mut accumulator = ChatAccumulator::new();
        let mut frames = 0usize;

        loop {
            let record = match tokio::time::timeout(self.options.idle_timeout, records.next()).await
            {
                Err(_) => {
                    self.upstream.cancel();
                    warn!(
                        idle_ms = self.options.idle_timeout.as_millis(),
                        frames, "Stream idle timeout"
                    );
                    let message = format!(
                        "no data from backend for {}ms",
                        self.options.idle_timeout.as_millis()
                    );
                    let _ = self.send_error(message, "timeout").await;
                    return RelayOutcome::TimedOut;
                }
                Ok(None) => {
                    let err = accumulator
                        .finish()
                        .err()
                        .unwrap_or_else(|| BackendError::IncompleteStream("stream ended".into()));
                    warn!(frames, "Stream ended without a terminal record");
                    return self.fail(GatewayError::Upstream(err)).await;
                }
                Ok(Some(Err(e))) => {
                    error!(error = %e, frames, "Backend stream failed");
                    return self.fail(GatewayError::Upstream(e)).await;
                }
                Ok(Some(Ok(record))) => record,
            };

            if let Some(message) = record.upstream_error() {
                error!(error = message, frames, "Backend reported an error in-band");
                let err = BackendError::Upstream(message.to_string());
                return self.fail(GatewayError::Upstream(err)).await;
            }

            accumulator.observe(&record);
            let payload = match serde_json::to_value(&record) {
                Ok(payload) => payload,
                Err(e) => return self.fail(GatewayError::Internal(e.to_string())).await,
            };
            if self.sink.send(RelayFrame::Data(payload)).await.is_err() {
                self.upstream.cancel();
                debug!(frames, "Client disconnected mid-stream");
                return RelayOutcome::Disconnected;
            }
            frames += 1;

            if record.is_terminal() {
                let content = accumulator.content().to_string();
                let summary = SummaryFrame {
                    status: "success",
                    message: self.options.summary_message.clone(),
                    content: self.options.include_content.then(|| content.clone()),
                    serial: Uuid::new_v4().to_string(),
                    time_taken: self.elapsed_nanos(),
                };
                if self.sink.send(RelayFrame::Summary(summary)).await.is_err() {
                    return RelayOutcome::Disconnected;
                }
                debug!(frames, "Stream completed");
                return RelayOutcome::Completed { content, frames };
            }
        }
    }

    /// Close the stream with one error frame.
    ///
    /// Used directly when the upstream could not be opened after the
    /// response was already committed to streaming.
    pub async fn fail(mut self, error: GatewayError) -> RelayOutcome {
        self.upstream.cancel();
        let kind = frame_kind(&error);
        if self.send_error(error.to_string(), kind).await.is_err() {
            return RelayOutcome::Disconnected;
        }
        if error.is_timeout() {
            RelayOutcome::TimedOut
        } else {
            RelayOutcome::Failed(error)
        }
    }

    async fn send_error(
        &mut self,
        message: String,
        kind: &'static str,
    ) -> Result<(), SinkClosed> {
        let frame = ErrorFrame {
            status: "error",
            error: message,
            kind,
            serial: Uuid::new_v4().to_string(),
            time_taken: self.elapsed_nanos(),
        };
        self.sink.send(RelayFrame::Error(frame)).await
    }

    fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

fn frame_kind(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::Upstream(e) => e.frame_kind(),
        other => other.kind(),
    }
}
