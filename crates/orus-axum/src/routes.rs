//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AppContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Prefix every API route is nested under.
pub const API_PREFIX: &str = "/orus-api/v1";

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the prefix, state not yet applied.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/system-info", get(handlers::system::info))
        .route("/embed-text", post(handlers::embed::embed_text))
        .route("/model-list", get(handlers::models::list))
        .route("/pull-model", post(handlers::models::pull))
        .route("/call-llm", post(handlers::chat::call_llm))
        .route("/generate", post(handlers::generate::generate))
}

/// Create the main router: `/health` plus the API under [`API_PREFIX`].
pub fn create_router(ctx: AppContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest(API_PREFIX, api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn health_check() -> &'static str {
    "OK"
}
