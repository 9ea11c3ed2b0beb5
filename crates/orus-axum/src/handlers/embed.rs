//! Text embedding handler.

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use orus_core::EmbedTextRequest;
use tracing::{error, info};

use super::request_deadline;
use crate::dto::{EmbedData, OrusResponse};
use crate::error::HttpError;
use crate::state::AppState;

/// Embed `text` with the provider `model` routes to.
pub async fn embed_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OrusResponse<EmbedData>>, HttpError> {
    let started = Instant::now();
    let request = EmbedTextRequest::from_body(&body).map_err(|e| HttpError::from(e).since(started))?;
    let deadline = request_deadline(&state, &headers).map_err(|e| e.since(started))?;
    info!(model = %request.model, chars = request.text.len(), "Embed request");

    let outcome = state
        .embeddings
        .embed_text(&request, deadline)
        .await
        .map_err(|e| {
            error!(model = %request.model, error = %e, "Embedding failed");
            HttpError::from(e).since(started)
        })?;

    let data = EmbedData {
        dimensions: outcome.vector.dimensions(),
        quantization: outcome.vector.precision().as_str(),
        vector: outcome.vector.into_data(),
        model: request.model,
        text: request.text,
    };
    Ok(Json(OrusResponse::success(
        "Embed request received successfully",
        data,
        started,
    )))
}
