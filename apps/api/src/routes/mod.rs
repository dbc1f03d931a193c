pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/upload", post(handlers::handle_upload))
        .route(
            "/upload-and-analyze",
            post(handlers::handle_upload_and_analyze),
        )
        .route("/analyze", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
