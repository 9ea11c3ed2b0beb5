//! Deadline-bounded execution of one unit of backend work.
//!
//! Each dispatch spawns exactly one worker task. The worker runs the
//! operation until it finishes or its `CancellationToken` fires; the caller
//! waits on the worker's oneshot channel under the deadline. Exactly one
//! `DispatchResult` comes out of every dispatch.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::settings::DEFAULT_REQUEST_TIMEOUT;

/// Outcome of a dispatched operation.
#[derive(Debug)]
pub enum DispatchResult<T> {
    Success(T),
    /// The operation itself failed (or the worker died).
    BackendError(GatewayError),
    /// The deadline fired first. The operation has been cancelled.
    Timeout(Duration),
}

impl<T> DispatchResult<T> {
    /// Collapse into a `Result`, mapping a timeout to `GatewayError::Timeout`.
    pub fn into_result(self) -> Result<T, GatewayError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::BackendError(e) => Err(e),
            Self::Timeout(deadline) => Err(GatewayError::Timeout(deadline)),
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Runs operations under a deadline.
#[derive(Debug, Clone, Copy)]
pub struct RequestDispatcher {
    default_deadline: Duration,
}

impl Default for RequestDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl RequestDispatcher {
    pub const fn new(default_deadline: Duration) -> Self {
        Self { default_deadline }
    }

    pub const fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    /// The configured deadline, unless the caller asked for a shorter one.
    pub fn effective_deadline(&self, requested: Option<Duration>) -> Duration {
        requested
            .filter(|d| !d.is_zero())
            .map_or(self.default_deadline, |d| d.min(self.default_deadline))
    }

    /// Run `operation` once on a worker task and wait at most `deadline`.
    ///
    /// The operation receives a token that is cancelled when the deadline
    /// fires; the worker drops the in-flight future at that point.
    pub async fn dispatch<T, F, Fut>(&self, deadline: Duration, operation: F) -> DispatchResult<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, GatewayError>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let worker_cancel = cancel.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = worker_cancel.cancelled() => None,
                result = operation(worker_cancel.clone()) => Some(result),
            };
            if let Some(result) = outcome {
                // Receiver is gone if the deadline already fired.
                let _ = tx.send(result);
            } else {
                debug!("Dispatched operation cancelled");
            }
        });

        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(Ok(value))) => DispatchResult::Success(value),
            Ok(Ok(Err(e))) => DispatchResult::BackendError(e),
            Ok(Err(_)) => DispatchResult::BackendError(GatewayError::Internal(
                "worker stopped without reporting a result".to_string(),
            )),
            Err(_) => {
                cancel.cancel();
                warn!(deadline_ms = deadline.as_millis(), "Dispatch deadline exceeded");
                DispatchResult::Timeout(deadline)
            }
        }
    }
}
