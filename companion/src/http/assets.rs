//! Web UI assets: `index.html` from the static directory, plus the PWA
//! manifest and service worker, which are generated in place.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::fs;
use tracing::debug;

use crate::app::AppState;

const SERVICE_WORKER: &str = "
self.addEventListener('install', e => self.skipWaiting());
self.addEventListener('activate', e => self.clients.claim());
self.addEventListener('fetch', e => {});
";

const APP_ICON: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><rect width='100' height='100' rx='22' fill='%230b0b10'/><text x='50' y='62' font-size='52' text-anchor='middle'>⏳</text></svg>";

/// Returns the router handling the UI entry point, manifest and service worker.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/manifest.json", get(serve_manifest))
        .route("/sw.js", get(serve_service_worker))
}

async fn serve_index(State(AppState { static_dir, .. }): State<AppState>) -> Response {
    let path = static_dir.join("index.html");
    match fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            debug!(path = %path.display(), "Cannot serve index.html: {e}");
            (
                StatusCode::NOT_FOUND,
                Html("<h1>index.html not found</h1>"),
            )
                .into_response()
        }
    }
}

async fn serve_manifest() -> impl IntoResponse {
    Json(json!({
        "name": "Ultra Pomodoro",
        "short_name": "Pomodoro",
        "start_url": "/",
        "display": "standalone",
        "background_color": "#0b0b10",
        "theme_color": "#0b0b10",
        "icons": [
            {
                "src": APP_ICON,
                "sizes": "192x192",
                "type": "image/svg+xml",
            }
        ],
    }))
}

async fn serve_service_worker() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        SERVICE_WORKER,
    )
}
