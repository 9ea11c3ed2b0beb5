//! Model pull progress records.

use serde::{Deserialize, Serialize};

use super::StreamRecord;

/// Status value the backend sends when a pull has finished.
pub const PULL_SUCCESS_STATUS: &str = "success";

/// One record of a backend `/api/pull` stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullProgress {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PullProgress {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }
}

impl StreamRecord for PullProgress {
    fn is_terminal(&self) -> bool {
        self.status == PULL_SUCCESS_STATUS
    }

    fn upstream_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
