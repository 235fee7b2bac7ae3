use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("queue.batch_size must be positive")]
    InvalidBatchSize,

    #[error("{field} must be positive")]
    InvalidInterval { field: &'static str },

    #[error("storage.container must not be empty")]
    EmptyContainer,

    #[error("http.request_timeout_secs must be positive")]
    InvalidRequestTimeout,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.queue.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize);
    }

    if config.queue.poll_interval_secs == 0 {
        return Err(ValidationError::InvalidInterval {
            field: "queue.poll_interval_secs",
        });
    }

    if config.worker.poll_interval_secs == 0 {
        return Err(ValidationError::InvalidInterval {
            field: "worker.poll_interval_secs",
        });
    }

    if config.storage.container.is_empty() {
        return Err(ValidationError::EmptyContainer);
    }

    if config.http.request_timeout_secs == 0 {
        return Err(ValidationError::InvalidRequestTimeout);
    }

    Ok(())
}
