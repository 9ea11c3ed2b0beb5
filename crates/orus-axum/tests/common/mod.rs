//! Shared helpers for route tests.

#![allow(dead_code)]

pub mod fake_backend;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use orus_axum::{AppContext, CorsConfig, create_router};
use orus_core::{Embedder, GatewayConfig};
use serde_json::Value;

use fake_backend::{EchoEmbedder, FakeBackend};

/// Router over `backend` with default settings.
pub fn app(backend: Arc<FakeBackend>) -> Router {
    app_with(backend, GatewayConfig::default(), Arc::new(EchoEmbedder))
}

pub fn app_with(
    backend: Arc<FakeBackend>,
    config: GatewayConfig,
    embedder: Arc<dyn Embedder>,
) -> Router {
    let ctx = AppContext::new(config, backend, embedder);
    create_router(ctx, &CorsConfig::AllowAll)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Payloads of every `data:` frame in an SSE body, in order.
pub async fn sse_frames(response: Response<Body>) -> Vec<Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    text.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
