use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            queue: QueueSettings::default(),
            worker: WorkerSettings::default(),
            storage: StorageSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Root directory for the embedded task store and queue
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_path: default_data_path(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/fetchpipe")
}

/// Ingestion worker settings (queue side)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueSettings {
    /// Delay between polling iterations, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Maximum messages taken per bulk receive
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// How long one receive call waits on an empty queue, in seconds
    #[serde(default = "default_receive_wait_secs")]
    pub receive_wait_secs: u64,
}

impl QueueSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn receive_wait(&self) -> Duration {
        Duration::from_secs(self.receive_wait_secs)
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            batch_size: default_batch_size(),
            receive_wait_secs: default_receive_wait_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    10
}

fn default_receive_wait_secs() -> u64 {
    5
}

/// Fulfillment worker settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerSettings {
    /// Delay between polling iterations, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Storage provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Memory,
    Local,
}

impl Default for StorageProvider {
    fn default() -> Self {
        StorageProvider::Local
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Container all fetched blobs are stored under
    #[serde(default = "default_container")]
    pub container: String,
    /// Filesystem root for the `local` provider
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            container: default_container(),
            local_path: default_local_path(),
        }
    }
}

fn default_container() -> String {
    "downloads".to_string()
}

fn default_local_path() -> PathBuf {
    PathBuf::from("data/blobs")
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    "fetchpipe/0.1.0".to_string()
}
