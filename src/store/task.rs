use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// `New` is the only non-terminal state; the fulfillment worker consumes
/// tasks in `New` and moves each to exactly one of the terminal states.
/// The codes are persisted as snake_case strings and must never be renamed
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    New,
    Completed,
    FileDownloadError,
    FileUploadError,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::New)
    }
}

/// A persisted unit of work: one requested download-and-store operation.
///
/// Created by the ingestion worker with `status = New`, mutated exactly once
/// by the fulfillment worker (status + `updated_at`), never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier; immutable, never reused.
    pub id: u64,
    pub resource_url: String,
    pub status: TaskStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh `New` task. The id is assigned by the store on create.
    pub fn new(id: u64, resource_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            resource_url: resource_url.into(),
            status: TaskStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance to a terminal status, refreshing `updated_at`.
    pub fn transition(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
