use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info};

use super::error::Result;
use super::task::{Task, TaskStatus};

/// Fjall-backed persistent storage for task records
///
/// Architecture:
/// - `tasks` partition: u64 (big-endian) → Task (JSON)
/// - `metadata` partition: "next_id" → u64 (atomic counter)
///
/// Big-endian keys keep the partition iteration in id order, so status
/// queries return tasks oldest-first. Handles are cheap to clone and safe to
/// share between the two workers and the API.
#[derive(Clone)]
pub struct TaskStore {
    keyspace: Keyspace,
    tasks: PartitionHandle,
    metadata: PartitionHandle,
    id_counter: Arc<AtomicU64>,
}

impl TaskStore {
    /// Open or create a task store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening task store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        let tasks = keyspace.open_partition("tasks", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        // Resume the id counter from metadata so ids are never reused
        let next_id = metadata
            .get(b"next_id")?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
            .unwrap_or(0);

        info!(next_id, "Task store opened");

        Ok(Self {
            keyspace,
            tasks,
            metadata,
            id_counter: Arc::new(AtomicU64::new(next_id)),
        })
    }

    /// Create a new `New` task for the given URL and return it with its
    /// assigned id.
    ///
    /// The write is synced to disk before this returns, so an accepted task
    /// cannot be lost once the originating queue message was acknowledged.
    pub fn create(&self, resource_url: &str) -> Result<Task> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let task = Task::new(id, resource_url);

        let value = serde_json::to_vec(&task)?;
        self.tasks.insert(id.to_be_bytes(), value)?;
        self.metadata.insert(b"next_id", (id + 1).to_be_bytes())?;
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;

        debug!(id, url = %task.resource_url, "Task created");
        Ok(task)
    }

    /// Get a task by id
    pub fn get(&self, id: u64) -> Result<Option<Task>> {
        match self.tasks.get(id.to_be_bytes())? {
            Some(value) => {
                let task = serde_json::from_slice(&value)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// List all tasks with the given status, in id order
    pub fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let mut results = Vec::new();

        for item in self.tasks.iter() {
            let (_, value) = item?;
            let task: Task = serde_json::from_slice(&value)?;
            if task.status == status {
                results.push(task);
            }
        }

        Ok(results)
    }

    /// Persist an updated task record
    ///
    /// The whole record is written under one key, so status and `updated_at`
    /// can never tear apart.
    pub fn update(&self, task: &Task) -> Result<()> {
        let value = serde_json::to_vec(task)?;
        self.tasks.insert(task.id.to_be_bytes(), value)?;
        debug!(id = task.id, status = ?task.status, "Task updated");
        Ok(())
    }

    /// Current value of the id counter (next id to be assigned)
    pub fn next_id(&self) -> u64 {
        self.id_counter.load(Ordering::SeqCst)
    }

    /// Flush all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    /// Health check - verify the store is accessible
    pub fn health_check(&self) -> Result<()> {
        let _ = self.metadata.get(b"next_id")?;
        Ok(())
    }

    /// Get internal statistics (for debugging/monitoring)
    pub fn stats(&self) -> Result<StoreStats> {
        let mut task_count = 0;
        let mut pending_count = 0;

        for item in self.tasks.iter() {
            let (_, value) = item?;
            let task: Task = serde_json::from_slice(&value)?;
            task_count += 1;
            if task.status == TaskStatus::New {
                pending_count += 1;
            }
        }

        Ok(StoreStats {
            task_count,
            pending_count,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub task_count: usize,
    pub pending_count: usize,
}
