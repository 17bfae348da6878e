//! Route configuration for the log API.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, ingest_log, method_not_allowed, retrieve_logs};
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the log API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/health", get(health_check))
        // Ingest
        .route("/logdata", post(ingest_log).fallback(method_not_allowed))
        .route("/logdata/", post(ingest_log).fallback(method_not_allowed))
        // Retrieve
        .route("/getdata", get(retrieve_logs).fallback(method_not_allowed))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
