//! Worker pools on top of the channel queue.
//!
//! A [`WorkerPoolQueue`] owns a [`ChannelQueue`](crate::queue::ChannelQueue)
//! and a fixed number of tokio tasks that pop batches from it and pass them
//! to a [`Handler`]. Items are JSON-encoded on the way in, so any
//! `Serialize + DeserializeOwned` type can be queued.
//!
//! # Module Structure
//!
//! - `pool`: the pool and its worker loop
//! - `handler`: the trait workers call
//! - `error`: pool errors

mod error;
mod handler;
mod pool;


pub use error::{PoolError, Result};
pub use handler::Handler;
pub use pool::WorkerPoolQueue;
