//! Pipeline workers
//!
//! Two long-lived polling loops connected only through the task store:
//!
//! - [`IngestWorker`] drains queued request messages into durable tasks.
//! - [`FulfillWorker`] executes pending tasks against external I/O and
//!   records the outcome on each task.
//!
//! Each worker owns its own cancellation-aware loop; the server spawns both
//! and cancels a shared token on shutdown. An error inside one iteration is
//! logged and the loop continues on the next schedule; workers never crash
//! the process.

pub mod fulfill;
pub mod http;
pub mod ingest;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub use fulfill::FulfillWorker;
pub use http::{FetchError, HttpFetcher, ResourceFetcher};
pub use ingest::IngestWorker;

/// Waits out the inter-iteration delay, returning `false` as soon as the
/// token fires.
pub(crate) async fn idle(token: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}
