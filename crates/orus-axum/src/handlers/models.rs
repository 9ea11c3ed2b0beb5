//! Model listing and pull handlers.

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use orus_core::PullModelRequest;
use tracing::{error, info};

use super::{PendingStream, relay_options, request_deadline};
use crate::dto::{ModelListData, OrusResponse};
use crate::error::HttpError;
use crate::state::AppState;

/// Models installed on the backend.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OrusResponse<ModelListData>>, HttpError> {
    let started = Instant::now();
    let deadline = request_deadline(&state, &headers).map_err(|e| e.since(started))?;

    let models = state.models.list(deadline).await.map_err(|e| {
        error!(error = %e, "Listing models failed");
        HttpError::from(e).since(started)
    })?;

    Ok(Json(OrusResponse::success(
        "Ollama model list retrieved successfully",
        ModelListData { models },
        started,
    )))
}

/// Pull a model and stream progress as SSE frames.
pub async fn pull(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let started = Instant::now();
    let request = PullModelRequest::from_body(&body).map_err(|e| HttpError::from(e).since(started))?;
    let deadline = request_deadline(&state, &headers).map_err(|e| e.since(started))?;
    info!(model = %request.name, "Pull request");

    let options = relay_options(
        &state,
        format!("Model {} downloaded successfully", request.name),
    )
    .without_content();
    let pending = PendingStream::open(&headers, options, started).map_err(|e| e.since(started))?;

    let records = state
        .models
        .open_pull(&request, deadline, pending.cancel.clone())
        .await
        .map_err(|e| {
            error!(model = %request.name, error = %e, "Pull could not start");
            HttpError::from(e).since(started)
        })?;

    Ok(pending.respond("pull-model", records))
}
