//! API models for the fetchpipe submission and status endpoints.
//!
//! `POST /api/downloads` accepts a [`DownloadRequest`]; the same JSON shape
//! travels through the queue to the ingestion worker, which decodes one
//! request per message. Task outcomes are observed out-of-band via
//! `GET /api/tasks/{id}`, which returns the persisted task snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One download submission. Also the wire format of a queue message body.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DownloadRequest {
    #[serde(rename = "resourceUrl")]
    pub resource_url: String,
}

/// 202 response for an accepted submission. The `request_id` identifies the
/// submission, not the task - the task id is assigned later, by the store,
/// when the ingestion worker picks the message up.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmissionAcceptedResponse {
    pub request_id: String,
    pub resource_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
