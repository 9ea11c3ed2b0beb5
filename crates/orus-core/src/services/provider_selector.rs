//! Embedding provider selection.

use crate::domain::{Precision, ProviderKind, ProviderRoute};
use crate::error::GatewayError;

const ROUTES: &[ProviderRoute] = &[
    ProviderRoute {
        model: "bge-m3",
        provider: ProviderKind::InProcess,
        backend_model: "bge-m3",
        precision: Precision::Float32,
    },
    ProviderRoute {
        model: "ollama-bge-m3",
        provider: ProviderKind::Remote,
        backend_model: "bge-m3:latest",
        precision: Precision::Float64,
    },
    ProviderRoute {
        model: "nomic-embed-text",
        provider: ProviderKind::Remote,
        backend_model: "nomic-embed-text",
        precision: Precision::Float64,
    },
    ProviderRoute {
        model: "nomic-embed-text:latest",
        provider: ProviderKind::Remote,
        backend_model: "nomic-embed-text:latest",
        precision: Precision::Float64,
    },
];

/// Maps embedding model ids to providers through a fixed table.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSelector {
    routes: &'static [ProviderRoute],
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self { routes: ROUTES }
    }
}

impl ProviderSelector {
    /// Exact-match lookup. Unknown ids are an error, never a fallback.
    pub fn resolve(&self, model: &str) -> Result<ProviderRoute, GatewayError> {
        self.routes
            .iter()
            .find(|route| route.model == model)
            .copied()
            .ok_or_else(|| GatewayError::InvalidModel(model.to_string()))
    }

    /// Client-visible model ids, in table order.
    pub fn model_ids(&self) -> Vec<&'static str> {
        self.routes.iter().map(|route| route.model).collect()
    }
}
