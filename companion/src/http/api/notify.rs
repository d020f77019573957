//! Desktop notification endpoint.

use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{app::AppState, http::api::lenient_json};

const DEFAULT_TITLE: &str = "Ultra Pomodoro";
const DEFAULT_BODY: &str = "Session complete.";

#[derive(Debug, Default, Deserialize)]
struct NotifyRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

pub(super) async fn handle_notify(
    State(AppState { notifier, .. }): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    let request: NotifyRequest = lenient_json(&body);
    let title = request.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let text = request.body.as_deref().unwrap_or(DEFAULT_BODY);
    let ok = notifier.notify(title, text).await;
    debug!(title, ok, "Dispatched notification");
    Json(json!({ "ok": ok }))
}
