use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    models::{DownloadRequest, SubmissionAcceptedResponse},
    state::AppState,
};
use crate::api::error::ApiError;

/// Download submission endpoint (POST /api/downloads)
///
/// Thin producer side of the pipeline: validates the request, serializes it
/// and publishes it to the queue. The caller only learns that the request
/// was queued - task outcome is observed later via `GET /api/tasks/{id}`.
pub async fn submit_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = super::validation::validate_request(&request) {
        warn!(error = %e, "Rejecting download submission");
        return Err(ApiError::InvalidPayload(e.to_string()));
    }

    info!(url = %request.resource_url, "Received download request");

    let body = serde_json::to_string(&request)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize request: {}", e)))?;

    state
        .queue
        .publish(&body)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to publish request: {}", e)))?;

    state.metrics.request_accepted();

    let response = SubmissionAcceptedResponse {
        request_id: Uuid::now_v7().to_string(),
        resource_url: request.resource_url,
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Task status endpoint (GET /api/tasks/{id})
///
/// Returns the persisted task snapshot: status, URL and timestamps. This is
/// the only way a requester observes the outcome of a submission.
pub async fn get_task(
    State(state): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state
        .store
        .get(id)
        .map_err(|e| ApiError::Internal(format!("Failed to get task: {}", e)))?
        .ok_or_else(|| ApiError::NotFound(format!("task {id}")))?;

    Ok((StatusCode::OK, Json(task)))
}

/// Health check endpoint (GET /health)
///
/// Reports per-component health for the queue and the task store.
/// Returns 503 Service Unavailable if any component is unhealthy.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();

    components.insert("api".to_string(), "healthy".to_string());
    components.insert(
        "queue".to_string(),
        if state.queue.health().await {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
    );
    components.insert(
        "store".to_string(),
        if state.store.health_check().is_ok() {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
    );

    let all_healthy = components.values().all(|status| status == "healthy");
    let overall_status = if all_healthy { "healthy" } else { "unhealthy" };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = super::models::HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
