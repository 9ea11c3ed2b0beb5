//! Axum server bootstrap - the composition root.
//!
//! This is the only place where concrete adapters are instantiated and
//! wired into the core services.

use std::sync::Arc;

use anyhow::{Context, Result};
use orus_core::{
    ChatService, Embedder, EmbeddingService, GatewayConfig, InferenceBackendPort, ModelService,
    ProviderSelector, RequestDispatcher,
};
use orus_ollama::{OllamaClient, OllamaClientConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// No configured origins means allow all.
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.is_empty() {
            Self::AllowAll
        } else {
            Self::AllowOrigins(origins.to_vec())
        }
    }
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub gateway: GatewayConfig,
    pub cors: CorsConfig,
}

impl From<GatewayConfig> for ServerConfig {
    fn from(gateway: GatewayConfig) -> Self {
        let cors = CorsConfig::from_origins(&gateway.cors_origins);
        Self { gateway, cors }
    }
}

/// Application context for the Axum adapter.
///
/// Holds every service the handlers call. Services are cheap to clone and
/// share the backend client's connection pool.
#[derive(Debug)]
pub struct AppContext {
    pub config: GatewayConfig,
    pub dispatcher: RequestDispatcher,
    pub chat: ChatService,
    pub embeddings: EmbeddingService,
    pub models: ModelService,
}

impl AppContext {
    /// Wire services around an already-built backend and embedder.
    pub fn new(
        config: GatewayConfig,
        backend: Arc<dyn InferenceBackendPort>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let dispatcher = RequestDispatcher::new(config.request_timeout);
        Self {
            chat: ChatService::new(Arc::clone(&backend), dispatcher),
            embeddings: EmbeddingService::new(
                ProviderSelector::default(),
                embedder,
                Arc::clone(&backend),
                dispatcher,
            ),
            models: ModelService::new(backend, dispatcher),
            dispatcher,
            config,
        }
    }
}

/// Build the Ollama client and all services.
pub fn bootstrap(config: &ServerConfig, embedder: Arc<dyn Embedder>) -> Result<AppContext> {
    let gateway = &config.gateway;
    gateway.validate().context("invalid gateway configuration")?;

    let client = OllamaClient::new(
        OllamaClientConfig::new()
            .with_base_url(&gateway.ollama_base_url)
            .with_timeout(gateway.backend_timeout),
    )
    .context("failed to build Ollama client")?;
    info!(
        ollama = client.base_url(),
        request_timeout_s = gateway.request_timeout.as_secs(),
        stream_idle_timeout_s = gateway.stream_idle_timeout.as_secs(),
        "Ollama backend configured"
    );

    if !gateway.embedder.is_complete() {
        info!("In-process embedder paths not fully configured; bge-m3 requests will fail");
    }

    Ok(AppContext::new(gateway.clone(), Arc::new(client), embedder))
}

/// Bootstrap, bind and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: ServerConfig,
    embedder: Arc<dyn Embedder>,
    shutdown: CancellationToken,
) -> Result<()> {
    let ctx = bootstrap(&config, embedder)?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.gateway.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Orus gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Orus gateway shut down");
    Ok(())
}
