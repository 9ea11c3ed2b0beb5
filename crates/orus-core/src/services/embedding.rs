//! Text embedding service.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::domain::{EmbedTextRequest, EmbeddingVector, ProviderKind, ProviderRoute, VectorData};
use crate::error::GatewayError;
use crate::ports::{BackendError, Embedder, InferenceBackendPort};
use crate::services::dispatcher::RequestDispatcher;
use crate::services::provider_selector::ProviderSelector;

/// A computed embedding and the route that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutcome {
    pub route: ProviderRoute,
    pub vector: EmbeddingVector,
}

/// Embeds text with whichever provider the model id routes to.
#[derive(Clone)]
pub struct EmbeddingService {
    selector: ProviderSelector,
    embedder: Arc<dyn Embedder>,
    backend: Arc<dyn InferenceBackendPort>,
    dispatcher: RequestDispatcher,
}

impl fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("selector", &self.selector)
            .field("backend", &self.backend)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl EmbeddingService {
    pub fn new(
        selector: ProviderSelector,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn InferenceBackendPort>,
        dispatcher: RequestDispatcher,
    ) -> Self {
        Self {
            selector,
            embedder,
            backend,
            dispatcher,
        }
    }

    pub const fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    /// Resolve the model, then compute the vector under `deadline`.
    ///
    /// Unknown models fail before any work is dispatched.
    pub async fn embed_text(
        &self,
        request: &EmbedTextRequest,
        deadline: Duration,
    ) -> Result<EmbeddingOutcome, GatewayError> {
        let route = self.selector.resolve(&request.model)?;
        info!(
            model = route.model,
            provider = ?route.provider,
            precision = %route.precision,
            "Dispatching embedding"
        );

        let text = request.text.clone();
        let embedder = Arc::clone(&self.embedder);
        let backend = Arc::clone(&self.backend);

        let data = self
            .dispatcher
            .dispatch(deadline, move |cancel| async move {
                match route.provider {
                    ProviderKind::InProcess => {
                        let values = tokio::task::spawn_blocking(move || embedder.embed(&text))
                            .await
                            .map_err(|e| GatewayError::Internal(e.to_string()))??;
                        Ok(VectorData::Float32(values))
                    }
                    ProviderKind::Remote => {
                        let values = backend.embed(route.backend_model, &text, cancel).await?;
                        Ok(VectorData::Float64(values))
                    }
                }
            })
            .await
            .into_result()?;

        if data.is_empty() {
            return Err(BackendError::Decode("provider returned an empty embedding".into()).into());
        }

        Ok(EmbeddingOutcome {
            route,
            vector: EmbeddingVector::new(data, route.precision),
        })
    }
}
