//! Object storage abstraction for fetched resources
//! Uses Apache Arrow object_store crate

use async_trait::async_trait;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageProvider, StorageSettings};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after upload
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub etag: Option<String>,
    pub size: usize,
}

/// Blob storage boundary used by the fulfillment worker
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store text content under the given blob name inside the configured
    /// container
    async fn put_text(&self, name: &str, content: &str) -> Result<UploadMetadata>;
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub container: String,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, container: String) -> Self {
        Self { store, container }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            container: "fetchpipe-local".to_string(),
        }
    }

    /// Build a client from configuration (memory or local filesystem)
    pub fn from_settings(settings: &StorageSettings) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match settings.provider {
            StorageProvider::Memory => Arc::new(object_store::memory::InMemory::new()),
            StorageProvider::Local => {
                std::fs::create_dir_all(&settings.local_path)?;
                Arc::new(object_store::local::LocalFileSystem::new_with_prefix(
                    &settings.local_path,
                )?)
            }
        };

        Ok(Self::new(store, settings.container.clone()))
    }

    fn blob_path(&self, name: &str) -> StoragePath {
        StoragePath::from(format!("{}/{}", self.container, name))
    }

    /// Upload bytes to storage
    pub async fn upload(&self, name: &str, data: Vec<u8>) -> Result<UploadMetadata> {
        let path = self.blob_path(name);
        let size = data.len();

        let put_result = self.store.put(&path, data.into()).await?;

        tracing::info!(name, size, "Uploaded to storage");

        Ok(UploadMetadata {
            key: path.to_string(),
            etag: put_result.e_tag.clone(),
            size,
        })
    }

    /// Download from storage
    pub async fn download(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(name);

        let result = self.store.get(&path).await?;
        let bytes = result.bytes().await?;

        tracing::info!(name, size = bytes.len(), "Downloaded from storage");

        Ok(bytes.to_vec())
    }

    /// Check if a blob exists
    pub async fn exists(&self, name: &str) -> Result<bool> {
        match self.store.head(&self.blob_path(name)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn put_text(&self, name: &str, content: &str) -> Result<UploadMetadata> {
        self.upload(name, content.as_bytes().to_vec()).await
    }
}
