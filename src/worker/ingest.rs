//! Ingestion worker - turns queue messages into task records

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::models::DownloadRequest;
use crate::config::QueueSettings;
use crate::observability::Metrics;
use crate::queue::{QueueError, RequestQueue};
use crate::store::TaskStore;

/// Polls the queue in bulk and persists each decoded request as a `New`
/// task.
///
/// Message acknowledgement happens inside the receive call, so a crash
/// between receive and create can redeliver work under at-least-once
/// semantics; duplicates are accepted rather than deduplicated here.
pub struct IngestWorker {
    queue: Arc<dyn RequestQueue>,
    store: TaskStore,
    settings: QueueSettings,
    metrics: Arc<Metrics>,
    token: CancellationToken,
}

impl IngestWorker {
    pub fn new(
        queue: Arc<dyn RequestQueue>,
        store: TaskStore,
        settings: QueueSettings,
        metrics: Arc<Metrics>,
        token: CancellationToken,
    ) -> Self {
        Self {
            queue,
            store,
            settings,
            metrics,
            token,
        }
    }

    /// Run the polling loop until the cancellation token fires
    pub async fn run(self) {
        info!("Ingestion worker started");

        loop {
            if self.token.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_once().await {
                error!(error = %e, "Ingestion iteration failed");
            }

            if !super::idle(&self.token, self.settings.poll_interval()).await {
                break;
            }
        }

        warn!("Ingestion worker stopped");
    }

    /// Execute a single polling pass: one bulk receive, then process every
    /// received message
    pub async fn run_once(&self) -> Result<(), QueueError> {
        let messages = self
            .queue
            .receive_batch(self.settings.batch_size, self.settings.receive_wait())
            .await?;

        if messages.is_empty() {
            info!("No messages received");
            return Ok(());
        }

        for message in &messages {
            self.ingest_message(message);
        }

        Ok(())
    }

    /// Process one message body. Failures are logged and skipped so one bad
    /// message never aborts the batch.
    fn ingest_message(&self, body: &str) {
        if body.is_empty() {
            info!("Message received is empty");
            return;
        }

        let request: DownloadRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable message");
                return;
            }
        };

        match self.store.create(&request.resource_url) {
            Ok(task) => {
                self.metrics.task_created();
                info!(id = task.id, url = %task.resource_url, "Task created");
            }
            Err(e) => {
                error!(url = %request.resource_url, error = %e, "Failed to persist task");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Queue stub preloaded with one batch of message bodies
    struct StubQueue {
        batch: Mutex<Vec<String>>,
        receive_calls: AtomicUsize,
    }

    impl StubQueue {
        fn with_batch(bodies: &[&str]) -> Self {
            Self {
                batch: Mutex::new(bodies.iter().map(|b| b.to_string()).collect()),
                receive_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RequestQueue for StubQueue {
        async fn publish(&self, _body: &str) -> crate::queue::Result<u64> {
            unimplemented!("ingestion never publishes")
        }

        async fn receive_batch(
            &self,
            max_messages: usize,
            _max_wait: Duration,
        ) -> crate::queue::Result<Vec<String>> {
            self.receive_calls.fetch_add(1, Ordering::SeqCst);
            let mut batch = self.batch.lock().unwrap();
            let take = max_messages.min(batch.len());
            Ok(batch.drain(..take).collect())
        }

        async fn health(&self) -> bool {
            true
        }
    }

    fn build_worker(queue: Arc<StubQueue>) -> (IngestWorker, TaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = TaskStore::open(temp_dir.path().join("tasks")).unwrap();
        let worker = IngestWorker::new(
            queue,
            store.clone(),
            QueueSettings::default(),
            Arc::new(Metrics::new()),
            CancellationToken::new(),
        );
        (worker, store, temp_dir)
    }

    #[tokio::test]
    async fn test_valid_message_creates_new_task() {
        let queue = Arc::new(StubQueue::with_batch(&[
            r#"{"resourceUrl":"https://example.com/data.json"}"#,
        ]));
        let (worker, store, _temp) = build_worker(queue);

        worker.run_once().await.unwrap();

        let pending = store.list_by_status(TaskStatus::New).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].resource_url, "https://example.com/data.json");
        assert_eq!(pending[0].created_at, pending[0].updated_at);
    }

    #[tokio::test]
    async fn test_empty_batch_creates_nothing() {
        let queue = Arc::new(StubQueue::with_batch(&[]));
        let (worker, store, _temp) = build_worker(queue.clone());

        worker.run_once().await.unwrap();

        assert_eq!(queue.receive_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.stats().unwrap().task_count, 0);
    }

    #[tokio::test]
    async fn test_empty_message_is_skipped() {
        let queue = Arc::new(StubQueue::with_batch(&[
            "",
            r#"{"resourceUrl":"https://example.com/one"}"#,
        ]));
        let (worker, store, _temp) = build_worker(queue);

        worker.run_once().await.unwrap();

        // Exactly one task: the empty message produced nothing
        let pending = store.list_by_status(TaskStatus::New).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].resource_url, "https://example.com/one");
    }

    #[tokio::test]
    async fn test_undecodable_message_does_not_abort_batch() {
        let queue = Arc::new(StubQueue::with_batch(&[
            "this is not json",
            r#"{"wrongField":"x"}"#,
            r#"{"resourceUrl":"https://example.com/ok"}"#,
        ]));
        let (worker, store, _temp) = build_worker(queue);

        worker.run_once().await.unwrap();

        let pending = store.list_by_status(TaskStatus::New).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].resource_url, "https://example.com/ok");
    }

    #[tokio::test]
    async fn test_redelivered_message_creates_second_task() {
        // At-least-once: the same decoded message twice means two records
        let queue = Arc::new(StubQueue::with_batch(&[
            r#"{"resourceUrl":"https://example.com/dup"}"#,
            r#"{"resourceUrl":"https://example.com/dup"}"#,
        ]));
        let (worker, store, _temp) = build_worker(queue);

        worker.run_once().await.unwrap();

        let pending = store.list_by_status(TaskStatus::New).unwrap();
        assert_eq!(pending.len(), 2);
        assert_ne!(pending[0].id, pending[1].id);
        assert_eq!(pending[0].resource_url, pending[1].resource_url);
    }

    #[tokio::test]
    async fn test_cancellation_during_idle_stops_loop() {
        let temp_dir = TempDir::new().unwrap();
        let store = TaskStore::open(temp_dir.path().join("tasks")).unwrap();
        let token = CancellationToken::new();
        let worker = IngestWorker::new(
            Arc::new(StubQueue::with_batch(&[])),
            store,
            QueueSettings::default(), // 60s poll interval, loop parks in idle
            Arc::new(Metrics::new()),
            token.child_token(),
        );

        let handle = tokio::spawn(worker.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop after cancellation")
            .unwrap();
    }
}
