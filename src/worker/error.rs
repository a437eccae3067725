//! Worker pool error types.

use thiserror::Error;

use crate::queue::{ConfigError, QueueError};

/// Errors from [`WorkerPoolQueue`](super::WorkerPoolQueue) operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The underlying channel queue rejected the operation.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// An item could not be serialized into a payload.
    #[error("failed to encode item: {0}")]
    Encode(#[from] serde_json::Error),

    /// The pool settings are invalid.
    #[error("invalid queue settings: {0}")]
    Config(#[from] ConfigError),
}

impl PoolError {
    /// Returns the queue error, if this is one.
    pub fn as_queue_error(&self) -> Option<&QueueError> {
        match self {
            PoolError::Queue(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for worker pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
