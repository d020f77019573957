use core::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware as ax_middleware,
    routing::{self, any},
};
use tower::ServiceBuilder;
use tower_http::{
    ServiceBuilderExt as _, request_id::MakeRequestUuid, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{
    app::AppState,
    http::{api, assets, middleware::secure_headers_middleware},
    websocket,
};

/// Creates the routes of the service without state or middleware.
fn create_app_router() -> Router<AppState> {
    Router::new()
        .merge(assets::routes())
        .nest("/api", api::routes())
        .route("/ws", any(websocket::ws_handler))
}

/// Builds the complete application: routes, state and middleware.
pub fn create_app(app_state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .propagate_x_request_id()
        // must be after request-id
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(ax_middleware::from_fn(secure_headers_middleware));

    create_app_router()
        .with_state(app_state)
        .fallback(routing::any(|req: Request<Body>| async move {
            tracing::warn!(method = %req.method(), uri = %req.uri(), "Unhandled request");
            StatusCode::NOT_FOUND
        }))
        .layer(middleware_stack)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::http::test_support::{app_in, call, get};

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(&app_in(dir.path(), false), get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_security_headers_and_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let response = call(&app_in(dir.path(), false), get("/manifest.json")).await;
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert!(response.headers().contains_key("x-request-id"), "request id is propagated");
    }
}
