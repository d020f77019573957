//! Hosts blocking endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    app::AppState,
    blocking::{BlockError, normalize_domains, probe},
    http::api::lenient_json,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/apply", post(handle_apply))
        .route("/clear", post(handle_clear))
        .route("/flush", post(handle_flush))
        .route("/test", post(handle_test))
}

/// Body of `apply` and `test`. Entries that are not strings are skipped.
#[derive(Debug, Default, Deserialize)]
struct DomainsRequest {
    #[serde(default)]
    domains: Option<Vec<Value>>,
}

impl DomainsRequest {
    fn raw_domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().flatten().filter_map(Value::as_str)
    }
}

fn block_error_response(e: &BlockError) -> Response {
    let status = match *e {
        BlockError::Permission => StatusCode::FORBIDDEN,
        BlockError::WriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "ok": false, "error": e.kind() }))).into_response()
}

async fn handle_apply(State(AppState { blocker, .. }): State<AppState>, body: Bytes) -> Response {
    let request: DomainsRequest = lenient_json(&body);
    match blocker.apply(request.raw_domains()).await {
        Ok(domains) => Json(json!({ "ok": true, "domains": domains })).into_response(),
        Err(e) => {
            tracing::warn!("Failed to apply hosts block: {e}");
            block_error_response(&e)
        }
    }
}

async fn handle_clear(State(AppState { blocker, .. }): State<AppState>) -> Response {
    match blocker.clear().await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            tracing::warn!("Failed to clear hosts block: {e}");
            block_error_response(&e)
        }
    }
}

async fn handle_flush(State(AppState { blocker, .. }): State<AppState>) -> impl IntoResponse {
    blocker.flush().await;
    Json(json!({ "ok": true }))
}

async fn handle_test(body: Bytes) -> impl IntoResponse {
    let request: DomainsRequest = lenient_json(&body);
    let domains = normalize_domains(request.raw_domains());
    let resolutions = probe::resolve_all(&domains).await;
    Json(json!({ "ok": true, "resolutions": resolutions }))
}
