//! System information handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use crate::dto::{OrusResponse, SystemInfoDto};
use crate::state::AppState;

/// Static gateway metadata and the embedding model ids it accepts.
pub async fn info(State(state): State<AppState>) -> Json<OrusResponse<SystemInfoDto>> {
    let started = Instant::now();
    let info = SystemInfoDto::new(state.embeddings.selector().model_ids());
    Json(OrusResponse::success(
        "System info retrieved successfully",
        info,
        started,
    ))
}
