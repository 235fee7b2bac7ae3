use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fetchpipe::api;
use fetchpipe::api::state::AppState;
use fetchpipe::config::Config;
use fetchpipe::observability::Metrics;
use fetchpipe::queue::{FjallQueue, RequestQueue};
use fetchpipe::storage::StorageClient;
use fetchpipe::store::TaskStore;
use fetchpipe::worker::{FulfillWorker, HttpFetcher, IngestWorker};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Start the HTTP server and both pipeline workers, then block until a
/// shutdown signal arrives.
///
/// Shutdown order: the listener drains first, then the shared cancellation
/// token fires and both worker loops are joined.
pub async fn run(address: SocketAddr) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    let store = TaskStore::open(config.server.data_path.join("tasks"))
        .map_err(|e| format!("Failed to open task store: {}", e))?;

    let queue = Arc::new(
        FjallQueue::open(config.server.data_path.join("queue"))
            .map_err(|e| format!("Failed to open queue: {}", e))?,
    );

    let storage = StorageClient::from_settings(&config.storage)
        .map_err(|e| format!("Failed to initialize storage: {}", e))?;

    let fetcher = Arc::new(
        HttpFetcher::new(&config.http)
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?,
    );

    let metrics = Arc::new(Metrics::new());
    let token = CancellationToken::new();

    let queue_handle: Arc<dyn RequestQueue> = queue.clone();

    let ingest = IngestWorker::new(
        queue_handle.clone(),
        store.clone(),
        config.queue.clone(),
        metrics.clone(),
        token.child_token(),
    );
    let fulfill = FulfillWorker::new(
        store.clone(),
        fetcher,
        Arc::new(storage),
        config.worker.clone(),
        metrics.clone(),
        token.child_token(),
    );

    let ingest_handle = tokio::spawn(ingest.run());
    let fulfill_handle = tokio::spawn(fulfill.run());

    let state = AppState::new(config, queue_handle, store, metrics);
    let app = api::router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "fetchpipe API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stopping workers");
    token.cancel();
    let _ = ingest_handle.await;
    let _ = fulfill_handle.await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
