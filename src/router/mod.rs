//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::constants::webhook::{MAX_BODY_BYTES, PATH};
use crate::handlers::{health_check, receive_webhook};
use crate::middleware::request_logger_middleware;

/// Build the application router.
///
/// The webhook route accepts every method so that non-POST requests get the
/// JSON 405 body from the handler instead of axum's empty default.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            PATH,
            any(receive_webhook).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_logger_middleware)),
        )
        .with_state(app_state)
}
