//! Configuration management for fetchpipe
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use fetchpipe::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `FETCHPIPE__<section>__<key>`
//!
//! Examples:
//! - `FETCHPIPE__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `FETCHPIPE__QUEUE__POLL_INTERVAL_SECS=10`
//! - `FETCHPIPE__STORAGE__CONTAINER=downloads-prod`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/fetchpipe.toml`.
//! This can be overridden using the `FETCHPIPE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use models::{
    Config, HttpSettings, QueueSettings, ServerConfig, StorageProvider, StorageSettings,
    WorkerSettings,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`FETCHPIPE__*`)
    /// 2. TOML file (default: `config/fetchpipe.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:8080"
data_path = "data/fetchpipe"

[queue]
poll_interval_secs = 60
batch_size = 10
receive_wait_secs = 5

[worker]
poll_interval_secs = 30

[storage]
provider = "local"
container = "downloads"
local_path = "data/blobs"

[http]
connect_timeout_secs = 10
request_timeout_secs = 60
user_agent = "fetchpipe/0.1.0"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.worker.poll_interval_secs, 30);
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert_eq!(config.http.user_agent, "fetchpipe/0.1.0");
    }

    #[test]
    fn test_validation_catches_zero_batch_size() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[queue]
batch_size = 0
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result,
            Err(ConfigError::ValidationError(
                ValidationError::InvalidBatchSize
            ))
        ));
    }
}
