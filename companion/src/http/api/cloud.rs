//! Local "cloud" export/import of the app's saved data.
//!
//! The stored document is opaque JSON kept in a single file.

use std::io;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::fs;
use tracing::{info, warn};

use crate::app::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/export", get(handle_export))
        .route("/import", post(handle_import))
}

async fn handle_export(State(AppState { export_path, .. }): State<AppState>) -> impl IntoResponse {
    let data = match fs::read_to_string(&export_path).await {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %export_path.display(), "Stored export is not valid JSON: {e}");
            Value::Null
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Value::Null,
        Err(e) => {
            warn!(path = %export_path.display(), "Failed to read stored export: {e}");
            Value::Null
        }
    };
    Json(json!({ "ok": true, "data": data }))
}

async fn handle_import(
    State(AppState { export_path, .. }): State<AppState>,
    body: Bytes,
) -> Response {
    let data: Value = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": format!("invalid JSON: {e}") })),
            )
                .into_response();
        }
    };

    let written = match serde_json::to_string_pretty(&data) {
        Ok(text) => fs::write(&export_path, text).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match written {
        Ok(()) => {
            info!(path = %export_path.display(), "Stored imported data");
            Json(json!({ "ok": true })).into_response()
        }
        Err(error) => {
            warn!(path = %export_path.display(), "Failed to store imported data: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": error })),
            )
                .into_response()
        }
    }
}
