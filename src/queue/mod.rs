//! Bounded in-process work queue.
//!
//! # Module Structure
//!
//! - `channel`: the fixed-capacity FIFO with optional unique mode
//! - `config`: queue settings, overrides and environment loading
//! - `error`: queue and settings errors

mod channel;
mod config;
mod error;


pub use channel::{ChannelQueue, PUSH_BLOCK_TIME};
pub use config::{
    DEFAULT_BATCH_LENGTH, DEFAULT_CAPACITY, DEFAULT_MAX_WORKERS, MAX_CAPACITY, QueueSettings,
    QueueSettingsOverride,
};
pub use error::{ConfigError, QueueError, Result};
