use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use thiserror::Error;
use tracing::{debug, info};

use super::RequestQueue;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Invalid sequence number")]
    InvalidSequence,
}

pub type Result<T> = std::result::Result<T, QueueError>;

/// Interval between polls of the messages partition while a receive call
/// waits for its `max_wait` window to fill
const RECEIVE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// FjallQueue persists request messages using the Fjall embedded database
///
/// Architecture:
/// - `messages` partition: u64 (big-endian) → message body (UTF-8)
/// - `metadata` partition: "next_seq" → u64 (atomic counter)
///
/// Big-endian sequence keys keep iteration oldest-first, so a batch receive
/// drains the queue in publish order. A published message is synced to disk
/// before the call returns; a received message is gone once the call
/// returns.
pub struct FjallQueue {
    keyspace: Keyspace,
    messages: PartitionHandle,
    metadata: PartitionHandle,
    seq_counter: Arc<AtomicU64>,
}

impl FjallQueue {
    /// Open or create a queue at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening FjallQueue at: {}", path.as_ref().display());

        let keyspace = Config::new(path).open()?;

        let messages = keyspace.open_partition("messages", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        let current_seq = metadata
            .get(b"next_seq")?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
            .unwrap_or(0);

        info!(current_seq, "FjallQueue opened");

        Ok(Self {
            keyspace,
            messages,
            metadata,
            seq_counter: Arc::new(AtomicU64::new(current_seq)),
        })
    }

    fn publish_sync(&self, body: &str) -> Result<u64> {
        let seq = self.seq_counter.fetch_add(1, Ordering::SeqCst);

        self.messages.insert(seq.to_be_bytes(), body.as_bytes())?;
        self.metadata.insert(b"next_seq", (seq + 1).to_be_bytes())?;
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;

        debug!(seq, "Message published");
        Ok(seq)
    }

    /// Remove and return up to `max_messages` bodies, oldest first
    fn drain(&self, max_messages: usize) -> Result<Vec<String>> {
        let mut batch = Vec::new();

        for item in self.messages.iter().take(max_messages) {
            let (key, value) = item?;
            let body = String::from_utf8_lossy(&value).to_string();
            batch.push((key, body));
        }

        let mut bodies = Vec::with_capacity(batch.len());
        for (key, body) in batch {
            self.messages.remove(key)?;
            bodies.push(body);
        }

        if !bodies.is_empty() {
            self.keyspace.persist(fjall::PersistMode::SyncAll)?;
            debug!(count = bodies.len(), "Messages received and acknowledged");
        }

        Ok(bodies)
    }

    /// Number of messages currently queued
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.messages.iter() {
            item?;
            count += 1;
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get current sequence counter value
    pub fn current_seq(&self) -> u64 {
        self.seq_counter.load(Ordering::SeqCst)
    }

    fn health_sync(&self) -> Result<()> {
        let _ = self.metadata.get(b"next_seq")?;
        Ok(())
    }
}

#[async_trait]
impl RequestQueue for FjallQueue {
    async fn publish(&self, body: &str) -> Result<u64> {
        self.publish_sync(body)
    }

    async fn receive_batch(&self, max_messages: usize, max_wait: Duration) -> Result<Vec<String>> {
        let deadline = tokio::time::Instant::now() + max_wait;

        loop {
            let bodies = self.drain(max_messages)?;
            if !bodies.is_empty() {
                return Ok(bodies);
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(Vec::new());
            }

            tokio::time::sleep(RECEIVE_POLL_INTERVAL.min(max_wait)).await;
        }
    }

    async fn health(&self) -> bool {
        self.health_sync().is_ok()
    }
}
