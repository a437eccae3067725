//! Error types for queue operations and queue settings.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`ChannelQueue`](super::ChannelQueue) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue has been closed.
    #[error("queue channel is closed")]
    ChannelClosed,

    /// Unique mode rejected a payload that is already buffered.
    #[error("item already exists in the queue")]
    AlreadyInQueue,

    /// The caller's cancellation token fired first.
    #[error("operation cancelled")]
    Cancelled,

    /// No slot freed up within the push block time.
    #[error("push blocked for longer than {0:?}")]
    DeadlineExceeded(Duration),
}

impl QueueError {
    /// Returns true if this is a cancellation error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueueError::Cancelled)
    }

    /// Returns true if the queue has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, QueueError::ChannelClosed)
    }

    /// Returns true if unique mode rejected a duplicate.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, QueueError::AlreadyInQueue)
    }
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors from loading or validating [`QueueSettings`](super::QueueSettings).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("queue {0:?}: capacity must be positive")]
    ZeroCapacity(String),

    #[error("queue {name:?}: capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge {
        name: String,
        capacity: usize,
        max: usize,
    },

    #[error("queue {0:?}: batch length must be positive")]
    ZeroBatchLength(String),

    #[error("queue {0:?}: max workers must be positive")]
    ZeroMaxWorkers(String),

    /// A settings value could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
