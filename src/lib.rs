//! Bounded in-process work queue.
//!
//! This library provides the work queue used for asynchronous job
//! submission: a fixed-capacity FIFO of byte payloads with an optional
//! unique (deduplicating) mode, cancellable push and pop, and a worker pool
//! that feeds typed batches to a handler.
//!
//! - [`queue`]: the channel queue, its settings and errors
//! - [`worker`]: worker pools consuming a queue
//! - [`types`]: `Optional<T>` and the membership `Set<T>`

pub mod queue;
pub mod types;
pub mod worker;

#[cfg(test)]
mod test_utils;

pub use queue::{ChannelQueue, QueueError, QueueSettings};
pub use types::{Optional, Set};
pub use worker::{Handler, WorkerPoolQueue};
