//! Fulfillment worker - executes pending tasks against external I/O

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::WorkerSettings;
use crate::observability::Metrics;
use crate::storage::BlobStore;
use crate::store::{StoreError, Task, TaskStatus, TaskStore};

use super::http::ResourceFetcher;

/// Polls the store for `New` tasks and drives each through download and
/// upload, recording the outcome as a terminal status.
///
/// Per task: `New → Completed | FileDownloadError | FileUploadError`, one
/// shot, no retry. The upload is never attempted when the download failed.
pub struct FulfillWorker {
    store: TaskStore,
    fetcher: Arc<dyn ResourceFetcher>,
    blobs: Arc<dyn BlobStore>,
    settings: WorkerSettings,
    metrics: Arc<Metrics>,
    token: CancellationToken,
}

impl FulfillWorker {
    pub fn new(
        store: TaskStore,
        fetcher: Arc<dyn ResourceFetcher>,
        blobs: Arc<dyn BlobStore>,
        settings: WorkerSettings,
        metrics: Arc<Metrics>,
        token: CancellationToken,
    ) -> Self {
        Self {
            store,
            fetcher,
            blobs,
            settings,
            metrics,
            token,
        }
    }

    /// Run the polling loop until the cancellation token fires.
    ///
    /// Cancellation is observed at the top of each iteration and during the
    /// inter-iteration delay; an in-flight task finishes before the loop
    /// re-checks.
    pub async fn run(self) {
        info!("Fulfillment worker started");

        loop {
            if self.token.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_once().await {
                error!(error = %e, "Fulfillment iteration failed");
            }

            if !super::idle(&self.token, self.settings.poll_interval()).await {
                break;
            }
        }

        warn!("Fulfillment worker stopped");
    }

    /// Execute a single polling pass over all pending tasks
    pub async fn run_once(&self) -> Result<(), StoreError> {
        let pending = self.store.list_by_status(TaskStatus::New)?;

        if pending.is_empty() {
            info!("No pending tasks");
            return Ok(());
        }

        for mut task in pending {
            let outcome = self.execute(&task).await;
            task.transition(outcome);

            if let Err(e) = self.store.update(&task) {
                // The task stays New and will be retried by a later pass;
                // keep going with the rest of the batch.
                error!(id = task.id, error = %e, "Failed to persist task outcome");
                continue;
            }

            match outcome {
                TaskStatus::Completed => self.metrics.task_completed(),
                _ => self.metrics.task_failed(),
            }
        }

        Ok(())
    }

    /// Run one task to its terminal status
    async fn execute(&self, task: &Task) -> TaskStatus {
        info!(id = task.id, url = %task.resource_url, "Processing task");

        let body = match self.fetcher.fetch_text(&task.resource_url).await {
            Ok(body) => body,
            Err(e) => {
                error!(id = task.id, url = %task.resource_url, error = %e, "Download failed");
                return TaskStatus::FileDownloadError;
            }
        };

        let blob_name = format!("{}.json", task.id);
        match self.blobs.put_text(&blob_name, &body).await {
            Ok(meta) => {
                info!(id = task.id, blob = %meta.key, size = meta.size, "Resource stored");
                TaskStatus::Completed
            }
            Err(e) => {
                error!(id = task.id, blob = %blob_name, error = %e, "Upload failed");
                TaskStatus::FileUploadError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageError, UploadMetadata};
    use crate::worker::http::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Fetcher stub mapping URLs to canned outcomes
    struct StubFetcher {
        responses: HashMap<String, std::result::Result<String, u16>>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn ok(mut self, url: &str, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), Ok(body.to_string()));
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(url.to_string(), Err(status));
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for StubFetcher {
        async fn fetch_text(&self, url: &str) -> crate::worker::http::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::RequestFailed("connection refused".into())),
            }
        }
    }

    /// Blob store stub recording puts, optionally failing them all
    struct StubBlobs {
        puts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl StubBlobs {
        fn new() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn put_count(&self) -> usize {
            self.puts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BlobStore for StubBlobs {
        async fn put_text(
            &self,
            name: &str,
            content: &str,
        ) -> crate::storage::Result<UploadMetadata> {
            if self.fail {
                return Err(StorageError::UploadFailed("container unavailable".into()));
            }
            self.puts
                .lock()
                .unwrap()
                .push((name.to_string(), content.to_string()));
            Ok(UploadMetadata {
                key: name.to_string(),
                etag: None,
                size: content.len(),
            })
        }
    }

    fn build_worker(
        fetcher: Arc<StubFetcher>,
        blobs: Arc<StubBlobs>,
    ) -> (FulfillWorker, TaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = TaskStore::open(temp_dir.path().join("tasks")).unwrap();
        let worker = FulfillWorker::new(
            store.clone(),
            fetcher,
            blobs,
            WorkerSettings::default(),
            Arc::new(Metrics::new()),
            CancellationToken::new(),
        );
        (worker, store, temp_dir)
    }

    #[tokio::test]
    async fn test_successful_task_completes() {
        let fetcher = Arc::new(StubFetcher::new().ok("https://example.com/data", "payload"));
        let blobs = Arc::new(StubBlobs::new());
        let (worker, store, _temp) = build_worker(fetcher, blobs.clone());

        let task = store.create("https://example.com/data").unwrap();
        worker.run_once().await.unwrap();

        let done = store.get(task.id).unwrap().unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.updated_at >= done.created_at);

        let puts = blobs.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0], (format!("{}.json", task.id), "payload".to_string()));
    }

    #[tokio::test]
    async fn test_download_failure_skips_upload() {
        let fetcher = Arc::new(StubFetcher::new().status("https://example.com/missing", 404));
        let blobs = Arc::new(StubBlobs::new());
        let (worker, store, _temp) = build_worker(fetcher, blobs.clone());

        let task = store.create("https://example.com/missing").unwrap();
        worker.run_once().await.unwrap();

        let failed = store.get(task.id).unwrap().unwrap();
        assert_eq!(failed.status, TaskStatus::FileDownloadError);
        assert_eq!(blobs.put_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_is_recorded() {
        let fetcher = Arc::new(StubFetcher::new().ok("https://example.com/data", "payload"));
        let blobs = Arc::new(StubBlobs::failing());
        let (worker, store, _temp) = build_worker(fetcher, blobs);

        let task = store.create("https://example.com/data").unwrap();
        worker.run_once().await.unwrap();

        let failed = store.get(task.id).unwrap().unwrap();
        assert_eq!(failed.status, TaskStatus::FileUploadError);
    }

    #[tokio::test]
    async fn test_one_pass_leaves_nothing_pending() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .ok("https://example.com/a", "a")
                .status("https://example.com/b", 500),
        );
        let blobs = Arc::new(StubBlobs::new());
        let (worker, store, _temp) = build_worker(fetcher, blobs);

        store.create("https://example.com/a").unwrap();
        store.create("https://example.com/b").unwrap();
        store.create("https://example.com/unreachable").unwrap();

        worker.run_once().await.unwrap();

        // Every task reached exactly one terminal status
        assert!(store.list_by_status(TaskStatus::New).unwrap().is_empty());
        assert_eq!(store.list_by_status(TaskStatus::Completed).unwrap().len(), 1);
        assert_eq!(
            store
                .list_by_status(TaskStatus::FileDownloadError)
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_one_failing_task_does_not_block_the_rest() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .status("https://example.com/bad", 503)
                .ok("https://example.com/good", "ok"),
        );
        let blobs = Arc::new(StubBlobs::new());
        let (worker, store, _temp) = build_worker(fetcher, blobs.clone());

        store.create("https://example.com/bad").unwrap();
        let good = store.create("https://example.com/good").unwrap();

        worker.run_once().await.unwrap();

        let done = store.get(good.id).unwrap().unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(blobs.put_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_pending_list_touches_nothing() {
        let fetcher = Arc::new(StubFetcher::new());
        let blobs = Arc::new(StubBlobs::new());
        let (worker, _store, _temp) = build_worker(fetcher.clone(), blobs.clone());

        worker.run_once().await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(blobs.put_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_during_idle_stops_loop() {
        let fetcher = Arc::new(StubFetcher::new());
        let blobs = Arc::new(StubBlobs::new());
        let temp_dir = TempDir::new().unwrap();
        let store = TaskStore::open(temp_dir.path().join("tasks")).unwrap();
        let token = CancellationToken::new();
        let worker = FulfillWorker::new(
            store,
            fetcher,
            blobs,
            WorkerSettings::default(), // 60s poll interval, loop parks in idle
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
