//! Durable request queue
//!
//! The queue carries opaque message bodies from the HTTP submission endpoint
//! to the ingestion worker. Receiving a batch acknowledges (removes) the
//! returned messages, giving the same contract as a hosted queue service:
//! at-least-once delivery up to the receive call, nothing after it.

pub mod store;

use std::time::Duration;

use async_trait::async_trait;

pub use store::{FjallQueue, QueueError};

pub type Result<T> = std::result::Result<T, QueueError>;

/// Queue boundary used by the API (publish side) and the ingestion worker
/// (receive side)
#[async_trait]
pub trait RequestQueue: Send + Sync {
    /// Append a message body and return its sequence number
    async fn publish(&self, body: &str) -> Result<u64>;

    /// Receive up to `max_messages` bodies, oldest first, waiting up to
    /// `max_wait` when the queue is empty. Returned messages are removed
    /// from the queue as part of the call.
    async fn receive_batch(&self, max_messages: usize, max_wait: Duration) -> Result<Vec<String>>;

    /// Health check
    async fn health(&self) -> bool;
}
