//! Prompt completion handler (`/generate`).

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use orus_core::GenerateTextRequest;
use tracing::{error, info};

use super::{PendingStream, relay_options, request_deadline};
use crate::dto::{GenerateData, OrusResponse};
use crate::error::HttpError;
use crate::state::AppState;

const GENERATE_MESSAGE: &str = "Generate request received successfully";

pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let started = Instant::now();
    let request =
        GenerateTextRequest::from_body(&body).map_err(|e| HttpError::from(e).since(started))?;
    let deadline = request_deadline(&state, &headers).map_err(|e| e.since(started))?;
    info!(model = %request.model, streaming = request.stream, "Generate request");

    if request.stream {
        let pending =
            PendingStream::open(&headers, relay_options(&state, GENERATE_MESSAGE), started)
                .map_err(|e| e.since(started))?;
        let records = state
            .chat
            .open_generate_stream(&request, deadline, pending.cancel.clone())
            .await
            .map_err(|e| {
                error!(model = %request.model, error = %e, "Generate stream could not start");
                HttpError::from(e).since(started)
            })?;
        return Ok(pending.respond("generate", records));
    }

    let completion = state
        .chat
        .generate(&request, deadline)
        .await
        .map_err(|e| {
            error!(model = %request.model, error = %e, "Generate failed");
            HttpError::from(e).since(started)
        })?;

    let data = GenerateData {
        response: completion.content,
        model: request.model,
        prompt: request.prompt,
    };
    Ok(Json(OrusResponse::success(GENERATE_MESSAGE, data, started)).into_response())
}
