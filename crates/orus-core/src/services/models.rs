//! Model listing and pulling.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{PullModelRequest, PullProgress};
use crate::error::GatewayError;
use crate::ports::{InferenceBackendPort, RecordStream};
use crate::services::dispatcher::RequestDispatcher;

#[derive(Debug, Clone)]
pub struct ModelService {
    backend: Arc<dyn InferenceBackendPort>,
    dispatcher: RequestDispatcher,
}

impl ModelService {
    pub fn new(backend: Arc<dyn InferenceBackendPort>, dispatcher: RequestDispatcher) -> Self {
        Self {
            backend,
            dispatcher,
        }
    }

    /// Names of installed models, sorted.
    pub async fn list(&self, deadline: Duration) -> Result<Vec<String>, GatewayError> {
        let backend = Arc::clone(&self.backend);
        let mut models = self
            .dispatcher
            .dispatch(deadline, move |cancel| async move {
                backend.list_models(cancel).await.map_err(GatewayError::from)
            })
            .await
            .into_result()?;
        models.sort();
        models.dedup();
        Ok(models)
    }

    /// Start a pull. Only the request/response handshake runs under
    /// `deadline`; progress records arrive afterwards on the stream.
    pub async fn open_pull(
        &self,
        request: &PullModelRequest,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> Result<RecordStream<PullProgress>, GatewayError> {
        info!(model = %request.name, "Pulling model");
        let backend = Arc::clone(&self.backend);
        let name = request.name.clone();
        self.dispatcher
            .dispatch(deadline, move |_| async move {
                backend
                    .pull_model(&name, cancel)
                    .await
                    .map_err(GatewayError::from)
            })
            .await
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatRequest, GenerateChunk, GenerateRequest, StreamEvent};
    use crate::ports::BackendError;
    use async_trait::async_trait;
    use futures_util::{StreamExt, stream};

    #[derive(Debug)]
    struct Catalog;

    #[async_trait]
    impl InferenceBackendPort for Catalog {
        async fn chat(
            &self,
            _request: &ChatRequest,
            _cancel: CancellationToken,
        ) -> Result<RecordStream<StreamEvent>, BackendError> {
            Err(BackendError::Transport("not used".into()))
        }

        async fn generate(
            &self,
            _request: &GenerateRequest,
            _cancel: CancellationToken,
        ) -> Result<RecordStream<GenerateChunk>, BackendError> {
            Err(BackendError::Transport("not used".into()))
        }

        async fn pull_model(
            &self,
            name: &str,
            _cancel: CancellationToken,
        ) -> Result<RecordStream<PullProgress>, BackendError> {
            if name == "missing" {
                return Err(BackendError::Status {
                    status: 500,
                    body: "pull model manifest: file does not exist".into(),
                });
            }
            Ok(Box::pin(stream::iter(vec![
                Ok(PullProgress::status("pulling manifest")),
                Ok(PullProgress::status("success")),
            ])))
        }

        async fn embed(
            &self,
            _model: &str,
            _text: &str,
            _cancel: CancellationToken,
        ) -> Result<Vec<f64>, BackendError> {
            Err(BackendError::Transport("not used".into()))
        }

        async fn list_models(
            &self,
            _cancel: CancellationToken,
        ) -> Result<Vec<String>, BackendError> {
            Ok(vec![
                "llama3.1:8b".into(),
                "bge-m3:latest".into(),
                "llama3.1:8b".into(),
            ])
        }
    }

    fn service() -> ModelService {
        ModelService::new(Arc::new(Catalog), RequestDispatcher::default())
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_unique() {
        let models = service().list(Duration::from_secs(1)).await.unwrap();
        assert_eq!(models, vec!["bge-m3:latest", "llama3.1:8b"]);
    }

    #[tokio::test]
    async fn test_open_pull_yields_progress() {
        let request = PullModelRequest {
            name: "llama3".into(),
        };
        let stream = service()
            .open_pull(&request, Duration::from_secs(1), CancellationToken::new())
            .await
            .unwrap();

        let statuses: Vec<String> = stream.map(|p| p.unwrap().status).collect().await;
        assert_eq!(statuses, vec!["pulling manifest", "success"]);
    }

    #[test]
    fn test_pull_handshake_error_is_upstream() {
        let request = PullModelRequest {
            name: "missing".into(),
        };
        let result = tokio_test::block_on(service().open_pull(
            &request,
            Duration::from_secs(1),
            CancellationToken::new(),
        ));

        assert!(matches!(
            result,
            Err(GatewayError::Upstream(BackendError::Status { status: 500, .. }))
        ));
    }
}
