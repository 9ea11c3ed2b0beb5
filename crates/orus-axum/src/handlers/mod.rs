//! HTTP handlers for the Axum adapter.
//!
//! Handlers take the raw body as bytes and validate it into a typed
//! request once, so that missing fields and wrong types surface as
//! distinct validation errors instead of extractor rejections.

pub mod chat;
pub mod embed;
pub mod generate;
pub mod models;
pub mod system;

use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use orus_core::{
    RecordStream, RelayOptions, RelayOutcome, StreamRecord, StreamRelay, ValidationError,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::HttpError;
use crate::sse::{ChannelSink, FrameReceiver};
use crate::state::AppState;

/// Request header that shortens the deadline for one call.
pub const TIMEOUT_HEADER: &str = "x-orus-timeout-ms";

/// Deadline for this request: the configured default unless the client
/// asks for less.
pub(crate) fn request_deadline(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Duration, HttpError> {
    let Some(value) = headers.get(TIMEOUT_HEADER) else {
        return Ok(state.dispatcher.default_deadline());
    };
    let millis = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| ValidationError::invalid_type(TIMEOUT_HEADER, "a number of milliseconds"))?;
    Ok(state
        .dispatcher
        .effective_deadline(Some(Duration::from_millis(millis))))
}

/// A relay bound to a fresh SSE channel, not yet fed.
pub(crate) struct PendingStream {
    relay: StreamRelay<ChannelSink>,
    receiver: FrameReceiver,
    /// Cancelled by the relay when it gives up on the backend.
    pub cancel: CancellationToken,
}

impl PendingStream {
    /// Negotiate the sink and open the relay. Fails before anything is
    /// written when the client cannot take incremental frames.
    pub fn open(
        headers: &HeaderMap,
        options: RelayOptions,
        started: Instant,
    ) -> Result<Self, HttpError> {
        let (sink, receiver) = ChannelSink::for_request(headers);
        let cancel = CancellationToken::new();
        let relay = StreamRelay::open(sink, options)?
            .started_at(started)
            .with_upstream_cancel(cancel.clone());
        Ok(Self {
            relay,
            receiver,
            cancel,
        })
    }

    /// Spawn the relay over `records` and return the SSE response.
    pub fn respond<R: StreamRecord>(self, route: &'static str, records: RecordStream<R>) -> Response {
        let Self {
            relay, receiver, ..
        } = self;

        tokio::spawn(async move {
            match relay.run(records).await {
                RelayOutcome::Completed { frames, .. } => {
                    info!(route, frames, "Stream completed");
                }
                RelayOutcome::Failed(error) => {
                    warn!(route, kind = error.kind(), error = %error, "Stream closed with an error frame");
                }
                RelayOutcome::TimedOut => warn!(route, "Stream timed out"),
                RelayOutcome::Disconnected => info!(route, "Client disconnected mid-stream"),
            }
        });

        receiver.into_sse().into_response()
    }
}

/// Relay options for this gateway's idle window.
pub(crate) fn relay_options(state: &AppState, summary_message: impl Into<String>) -> RelayOptions {
    RelayOptions::new(state.config.stream_idle_timeout, summary_message)
}
