//! Incremental NDJSON decoding.
//!
//! Ollama streams one JSON object per line over a chunked body. Chunk
//! boundaries do not line up with line boundaries, so bytes are buffered
//! until a newline arrives and only then decoded.

use std::fmt::Display;
use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use orus_core::{BackendError, RecordStream, StreamRecord};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// State threaded through the `unfold` stream.
struct DecoderState<T> {
    body: BoxStream<'static, Result<Bytes, String>>,
    buf: BytesMut,
    cancel: CancellationToken,
    lines: usize,
    finished: bool,
    _record: PhantomData<fn() -> T>,
}

/// Decode a byte stream into typed records, one per NDJSON line.
///
/// - a terminal record is yielded and then the stream ends;
/// - end of body without a terminal record just ends the stream;
/// - a transport error or a malformed line yields one error and ends;
/// - cancelling `cancel` yields `BackendError::Cancelled` and ends.
pub fn decode_ndjson<T, S, E>(body: S, cancel: CancellationToken) -> RecordStream<T>
where
    T: StreamRecord,
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + 'static,
{
    let state = DecoderState::<T> {
        body: body.map(|chunk| chunk.map_err(|e| e.to_string())).boxed(),
        buf: BytesMut::new(),
        cancel,
        lines: 0,
        finished: false,
        _record: PhantomData,
    };

    Box::pin(futures_util::stream::unfold(state, |mut st| async move {
        if st.finished {
            return None;
        }

        loop {
            // Try to extract a complete line from the buffer.
            if let Some(line_end) = find_newline(&st.buf) {
                let line = st.buf.split_to(line_end);
                if let Some(item) = st.decode_line(&line) {
                    return Some((item, st));
                }
                continue;
            }

            // Need more data from upstream.
            let next = tokio::select! {
                biased;
                () = st.cancel.cancelled() => {
                    debug!(lines = st.lines, "NDJSON stream cancelled");
                    st.finished = true;
                    return Some((Err(BackendError::Cancelled), st));
                }
                next = st.body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    warn!("Upstream stream error: {e}");
                    st.finished = true;
                    return Some((Err(BackendError::Transport(e)), st));
                }
                None => {
                    // Body ended; decode a final unterminated line if any.
                    st.finished = true;
                    let rest = st.buf.split();
                    return st.decode_line(&rest).map(|item| (item, st));
                }
            }
        }
    }))
}

impl<T: StreamRecord> DecoderState<T> {
    /// Decode one line. `None` for blank lines.
    fn decode_line(&mut self, line: &[u8]) -> Option<Result<T, BackendError>> {
        let line = line.trim_ascii();
        if line.is_empty() {
            return None;
        }
        self.lines += 1;

        match serde_json::from_slice::<T>(line) {
            Ok(record) => {
                if record.is_terminal() {
                    debug!(lines = self.lines, "NDJSON stream reached terminal record");
                    self.finished = true;
                }
                Some(Ok(record))
            }
            Err(e) => {
                warn!(line = self.lines, "Malformed NDJSON line: {e}");
                self.finished = true;
                Some(Err(BackendError::Decode(format!(
                    "line {}: {e}",
                    self.lines
                ))))
            }
        }
    }
}

/// Position just past the next `\n`, if the buffer holds one.
fn find_newline(buf: &BytesMut) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use orus_core::{PullProgress, StreamEvent};
    use std::convert::Infallible;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        let owned: Vec<Result<Bytes, Infallible>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        stream::iter(owned)
    }

    async fn collect<T: StreamRecord>(
        stream: RecordStream<T>,
    ) -> Vec<Result<T, BackendError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let body = chunks(&[
            r#"{"message":{"role":"assistant","content":"Hel"},"do"#,
            "ne\":false}\n{\"message\":{\"role\":\"assistant\",",
            r#""content":"lo"},"done":true}"#,
            "\n",
        ]);

        let items = collect(decode_ndjson::<StreamEvent, _, _>(body, CancellationToken::new())).await;
        let contents: Vec<String> = items
            .into_iter()
            .map(|r| r.unwrap().message.content)
            .collect();
        assert_eq!(contents, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_blank_lines_and_crlf_are_skipped() {
        let body = chunks(&["\n\r\n{\"status\":\"pulling manifest\"}\r\n\n{\"status\":\"success\"}\n"]);
        let items = collect(decode_ndjson::<PullProgress, _, _>(body, CancellationToken::new())).await;
        assert_eq!(items.len(), 2);
        assert!(items[1].as_ref().unwrap().status == "success");
    }

    #[tokio::test]
    async fn test_final_unterminated_line_is_decoded() {
        let body = chunks(&[r#"{"message":{"content":"only"},"done":true}"#]);
        let items = collect(decode_ndjson::<StreamEvent, _, _>(body, CancellationToken::new())).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap().done);
    }

    #[tokio::test]
    async fn test_stops_after_terminal_record() {
        let body = chunks(&[
            "{\"status\":\"success\"}\n",
            "{\"status\":\"trailing garbage after success\"}\n",
        ]);
        let items = collect(decode_ndjson::<PullProgress, _, _>(body, CancellationToken::new())).await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_end_without_terminal_just_ends() {
        let body = chunks(&["{\"status\":\"pulling manifest\"}\n"]);
        let items = collect(decode_ndjson::<PullProgress, _, _>(body, CancellationToken::new())).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
    }

    #[tokio::test]
    async fn test_malformed_line_aborts_stream() {
        let body = chunks(&[
            "{\"message\":{\"content\":\"a\"},\"done\":false}\n",
            "{not json}\n",
            "{\"message\":{\"content\":\"b\"},\"done\":true}\n",
        ]);
        let items = collect(decode_ndjson::<StreamEvent, _, _>(body, CancellationToken::new())).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(&items[1], Err(BackendError::Decode(m)) if m.starts_with("line 2:")));
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"{\"status\":\"pulling\"}\n")),
            Err("connection reset"),
        ]);
        let items = collect(decode_ndjson::<PullProgress, _, _>(body, CancellationToken::new())).await;

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            Err(BackendError::Transport("connection reset".into()))
        );
    }

    #[tokio::test]
    async fn test_cancellation_yields_cancelled() {
        let cancel = CancellationToken::new();
        let body = stream::iter(vec![Ok::<_, Infallible>(Bytes::from_static(
            b"{\"status\":\"pulling\"}\n",
        ))])
        .chain(stream::pending());

        let mut records = decode_ndjson::<PullProgress, _, _>(body, cancel.clone());
        assert!(records.next().await.unwrap().is_ok());

        cancel.cancel();
        assert_eq!(records.next().await, Some(Err(BackendError::Cancelled)));
        assert!(records.next().await.is_none());
    }
}
