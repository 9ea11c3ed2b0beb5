//! Content delta accumulation.

use crate::domain::StreamRecord;
use crate::ports::BackendError;

/// Concatenates content deltas in arrival order.
///
/// No trimming, normalization or deduplication: the result is exactly the
/// ordered concatenation of every delta observed.
#[derive(Debug, Clone, Default)]
pub struct ChatAccumulator {
    content: String,
    records: usize,
    terminated: bool,
}

impl ChatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the cumulative content.
    pub fn append(&mut self, delta: &str) -> &str {
        self.content.push_str(delta);
        &self.content
    }

    /// Account for one record: append its delta, note termination.
    pub fn observe<R: StreamRecord>(&mut self, record: &R) {
        self.records += 1;
        if let Some(delta) = record.content_delta() {
            self.append(delta);
        }
        if record.is_terminal() {
            self.terminated = true;
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn records(&self) -> usize {
        self.records
    }

    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Final content, or `IncompleteStream` if no terminal record was seen.
    pub fn finish(self) -> Result<String, BackendError> {
        if self.terminated {
            Ok(self.content)
        } else {
            Err(BackendError::IncompleteStream(format!(
                "stream ended after {} records without a terminal record",
                self.records
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PullProgress, StreamEvent};

    #[test]
    fn test_append_returns_cumulative_content() {
        let mut acc = ChatAccumulator::new();
        assert_eq!(acc.append("Hel"), "Hel");
        assert_eq!(acc.append("lo"), "Hello");
        assert_eq!(acc.append(""), "Hello");
    }

    #[test]
    fn test_concatenation_is_exact_and_replayable() {
        let deltas = [" leading", "  double  ", "\n", "ünï", "code", "code"];
        let expected: String = deltas.concat();

        for _ in 0..2 {
            let mut acc = ChatAccumulator::new();
            for d in deltas {
                acc.append(d);
            }
            assert_eq!(acc.content(), expected);
        }
    }

    #[test]
    fn test_observe_tracks_termination() {
        let mut acc = ChatAccumulator::new();
        acc.observe(&StreamEvent::delta("m", "Hel", false));
        assert!(!acc.is_terminated());
        acc.observe(&StreamEvent::delta("m", "lo", true));

        assert_eq!(acc.records(), 2);
        assert_eq!(acc.finish().unwrap(), "Hello");
    }

    #[test]
    fn test_finish_without_terminal_is_incomplete() {
        let mut acc = ChatAccumulator::new();
        acc.observe(&PullProgress::status("pulling manifest"));
        assert!(matches!(
            acc.finish(),
            Err(BackendError::IncompleteStream(_))
        ));
    }
}
