//! `orus` gateway binary.

use std::sync::Arc;

use anyhow::Result;
use orus_axum::{ServerConfig, start_server};
use orus_core::{GatewayConfig, UnavailableEmbedder};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let dotenv = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = GatewayConfig::from_env()?;
    info!(
        config = %serde_json::to_string(&config).unwrap_or_default(),
        "Resolved gateway configuration"
    );

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    // The numeric embedding model is not linked into this build.
    start_server(
        ServerConfig::from(config),
        Arc::new(UnavailableEmbedder),
        shutdown,
    )
    .await
}
