pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analyze))
        .route("/api/v1/analysis/upload", post(handlers::handle_upload))
        .route("/api/v1/analysis/extract", post(handlers::handle_extract))
        .route(
            "/api/v1/analysis/stream",
            post(handlers::handle_analyze_stream),
        )
        // Longitudinal profiles
        .route(
            "/api/v1/profiles/aggregate",
            post(handlers::handle_aggregate),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
