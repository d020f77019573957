//! JSON API under `/api`.
//!
//! Request bodies are parsed leniently: a missing, malformed or wrongly shaped
//! body reads as the default request instead of being rejected.

mod block;
mod cloud;
mod notify;

use axum::{Router, body::Bytes, routing::post};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::app::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .nest("/block", block::routes())
        .merge(cloud::routes())
        .route("/notify", post(notify::handle_notify))
}

/// Decodes `body` as `T`, falling back to `T::default()`.
fn lenient_json<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!("Ignoring malformed request body: {e}");
        T::default()
    })
}
