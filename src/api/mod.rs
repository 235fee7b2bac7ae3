mod error;
pub mod models;
pub mod services;
pub mod state;
mod validation;

use axum::{Router, routing::get, routing::post};
use tower_http::decompression::RequestDecompressionLayer;

use state::AppState;

/// Build the API router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/downloads", post(services::submit_download))
        .route("/api/tasks/{id}", get(services::get_task))
        .route("/health", get(services::health))
        .with_state(state)
        // Automatically decompress gzip request bodies at the middleware level
        .layer(RequestDecompressionLayer::new())
}
