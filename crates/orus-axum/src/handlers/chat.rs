//! Chat handler (`/call-llm`).

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use orus_core::CallLlmRequest;
use tracing::{error, info};

use super::{PendingStream, relay_options, request_deadline};
use crate::dto::{ChatData, OrusResponse};
use crate::error::HttpError;
use crate::state::AppState;

const CHAT_MESSAGE: &str = "LLM request received successfully";

/// Run a chat, either to completion or as an SSE stream of deltas.
pub async fn call_llm(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let started = Instant::now();
    let request = CallLlmRequest::from_body(&body).map_err(|e| HttpError::from(e).since(started))?;
    let deadline = request_deadline(&state, &headers).map_err(|e| e.since(started))?;
    info!(
        model = %request.model,
        messages = request.messages.len(),
        streaming = request.stream,
        "Chat request"
    );

    if request.stream {
        let pending = PendingStream::open(&headers, relay_options(&state, CHAT_MESSAGE), started)
            .map_err(|e| e.since(started))?;
        let records = state
            .chat
            .open_stream(&request, deadline, pending.cancel.clone())
            .await
            .map_err(|e| {
                error!(model = %request.model, error = %e, "Chat stream could not start");
                HttpError::from(e).since(started)
            })?;
        return Ok(pending.respond("call-llm", records));
    }

    let completion = state
        .chat
        .complete(&request, deadline)
        .await
        .map_err(|e| {
            error!(model = %request.model, error = %e, "Chat failed");
            HttpError::from(e).since(started)
        })?;

    let data = ChatData {
        response: completion.content,
        model: request.model,
        messages: request.messages,
        stream: false,
    };
    Ok(Json(OrusResponse::success(CHAT_MESSAGE, data, started)).into_response())
}
