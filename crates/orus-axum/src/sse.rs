//! SSE output for streaming routes.
//!
//! The relay writes frames into a bounded channel through `ChannelSink`;
//! the receiving half becomes the body of an axum `Sse` response. A slow
//! client fills the channel and the relay waits, so backpressure reaches
//! the backend stream instead of piling up in memory. Dropping the
//! response (client gone) closes the channel and the relay stops.

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::ACCEPT;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use orus_core::{FrameSink, RelayFrame, SinkClosed};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

/// Frames buffered between the relay and the HTTP body.
pub const FRAME_BUFFER: usize = 32;

/// Interval between keep-alive comment frames.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Relay-side half of an SSE response.
#[derive(Debug)]
pub struct ChannelSink {
    sender: mpsc::Sender<RelayFrame>,
    flush: bool,
}

/// Body-side half of an SSE response.
#[derive(Debug)]
pub struct FrameReceiver(mpsc::Receiver<RelayFrame>);

impl ChannelSink {
    /// Create a connected sink/receiver pair.
    ///
    /// `flush` states whether the client can take frames incrementally;
    /// see [`accepts_event_stream`].
    pub fn channel(flush: bool) -> (Self, FrameReceiver) {
        let (sender, receiver) = mpsc::channel(FRAME_BUFFER);
        (Self { sender, flush }, FrameReceiver(receiver))
    }

    /// Sink for a request, negotiated from its `Accept` header.
    pub fn for_request(headers: &HeaderMap) -> (Self, FrameReceiver) {
        Self::channel(accepts_event_stream(headers))
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    fn supports_flush(&self) -> bool {
        self.flush
    }

    async fn send(&mut self, frame: RelayFrame) -> Result<(), SinkClosed> {
        self.sender.send(frame).await.map_err(|_| SinkClosed)
    }
}

/// Whether the client accepts `text/event-stream`.
///
/// A missing `Accept` header or a wildcard counts as yes. A client that
/// only accepts, say, `application/json` cannot consume incremental frames.
/// Media ranges compare case-insensitively and `q=0` means "not this one".
pub fn accepts_event_stream(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT) else {
        return true;
    };
    let Ok(accept) = accept.to_str() else {
        return false;
    };
    accept.split(',').any(|range| {
        let mut parts = range.split(';');
        let media = parts.next().unwrap_or_default().trim();
        let matches = media.is_empty()
            || ["text/event-stream", "text/*", "*/*"]
                .iter()
                .any(|candidate| media.eq_ignore_ascii_case(candidate));
        matches && !parts.any(refuses)
    })
}

/// Whether an `Accept` parameter is a zero quality value.
fn refuses(param: &str) -> bool {
    let Some((name, value)) = param.split_once('=') else {
        return false;
    };
    name.trim().eq_ignore_ascii_case("q")
        && value
            .trim()
            .parse::<f32>()
            .is_ok_and(|q| q <= 0.0)
}

impl FrameReceiver {
    /// Turn the receiver into an SSE response with keep-alive comments.
    pub fn into_sse(self) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let stream = ReceiverStream::new(self.0)
            .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.to_json().to_string())));

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(KEEP_ALIVE_INTERVAL)
                .text("ping"),
        )
    }
}
