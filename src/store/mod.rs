/// Fjall-based persistence layer for download tasks
///
/// This module provides durable storage for fetchpipe's task state. It uses
/// Fjall (an embedded LSM key-value store) to persist one record per accepted
/// download request:
///
/// - Task records (id, resource URL, status, timestamps)
/// - Metadata (persisted id counter)
///
/// ## Architecture
///
/// The store is the only shared resource between the ingestion worker (which
/// creates tasks) and the fulfillment worker (which advances them to a
/// terminal status). The two workers never talk to each other directly; a
/// task written here survives process restarts, so an accepted request is
/// never lost even if fulfillment is delayed.
///
/// Ids are assigned from a persisted sequence counter and are never reused,
/// including across reopens.
pub mod error;
pub mod store;
pub mod task;

pub use error::{Result, StoreError};
pub use store::{StoreStats, TaskStore};
pub use task::{Task, TaskStatus};
