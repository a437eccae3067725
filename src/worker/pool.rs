//! A worker pool consuming a channel queue.
//!
//! Items are JSON-encoded into payloads so that unique mode deduplicates on
//! the encoded form. Each worker task pops one payload (waiting if needed),
//! tops the batch up with whatever else is already buffered, decodes it and
//! passes it to the [`Handler`]. Items the handler hands back stay with that
//! worker and lead its next batch; they do not take a queue slot, so a full
//! queue cannot block the worker that would drain it.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::queue::{ChannelQueue, QueueError, QueueSettings};

use super::error::Result;
use super::handler::Handler;

/// A typed queue with a fixed set of worker tasks.
///
/// Must be started from within a tokio runtime. Dropping the pool without
/// calling [`shutdown`](Self::shutdown) still stops the workers, but does
/// not wait for in-flight batches.
pub struct WorkerPoolQueue<T> {
    settings: QueueSettings,
    queue: Arc<ChannelQueue>,

    /// Cancelled by [`shutdown`](Self::shutdown); parent of nothing else.
    shutdown: CancellationToken,

    /// Cancels `shutdown` if the pool is dropped.
    _stop_on_drop: DropGuard,

    /// Each worker returns the number of unhandled items it still held.
    workers: Vec<JoinHandle<usize>>,

    _item: PhantomData<fn(T) -> T>,
}

impl<T> WorkerPoolQueue<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// Validates `settings`, creates the queue and spawns the workers.
    pub fn start<H: Handler<T>>(settings: QueueSettings, handler: H) -> Result<Self> {
        Self::start_with_shutdown(settings, handler, &CancellationToken::new())
    }

    /// Like [`start`](Self::start), but workers also stop when `parent` is
    /// cancelled.
    pub fn start_with_shutdown<H: Handler<T>>(
        settings: QueueSettings,
        handler: H,
        parent: &CancellationToken,
    ) -> Result<Self> {
        settings.validate()?;

        let queue = Arc::new(ChannelQueue::new(&settings)?);
        let handler = Arc::new(handler);
        let shutdown = parent.child_token();

        let workers = (0..settings.max_workers)
            .map(|id| {
                tokio::spawn(run_worker::<T, H>(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&handler),
                    settings.batch_length,
                    shutdown.clone(),
                ))
            })
            .collect();

        info!(
            queue = %settings.name,
            workers = settings.max_workers,
            batch_length = settings.batch_length,
            "Started worker pool"
        );

        Ok(WorkerPoolQueue {
            settings,
            queue,
            _stop_on_drop: shutdown.clone().drop_guard(),
            shutdown,
            workers,
            _item: PhantomData,
        })
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Returns the number of worker tasks.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Encodes `item` and pushes it, with the same blocking and errors as
    /// [`ChannelQueue::push`].
    pub async fn push(&self, cancel: &CancellationToken, item: &T) -> Result<()> {
        let payload = serde_json::to_vec(item)?;
        self.queue.push(cancel, payload).await?;
        Ok(())
    }

    /// Returns true if an equal item is waiting in a unique queue.
    ///
    /// Items already handed to a worker are no longer waiting.
    pub fn has(&self, item: &T) -> Result<bool> {
        let payload = serde_json::to_vec(item)?;
        Ok(self.queue.has(&payload))
    }

    /// Returns the number of items waiting for a worker.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Stops the workers and closes the queue.
    ///
    /// Batches already handed to a handler are allowed to finish. Returns the
    /// number of items left waiting, including unhandled items workers were
    /// still holding. These are discarded.
    pub async fn shutdown(self) -> usize {
        info!(queue = %self.settings.name, "Shutting down worker pool");
        self.shutdown.cancel();

        let mut held = 0;
        for worker in self.workers {
            match worker.await {
                Ok(count) => held += count,
                Err(e) => error!(queue = %self.settings.name, error = %e, "Worker task failed"),
            }
        }

        let remaining = self.queue.len() + held;
        if let Err(e) = self.queue.close() {
            debug!(queue = %self.settings.name, error = %e, "Queue already closed");
        }
        if remaining > 0 {
            warn!(queue = %self.settings.name, remaining, "Discarding unprocessed items");
        }
        remaining
    }
}

/// One worker's event loop.
///
/// Returns the number of unhandled items left in its backlog.
#[instrument(skip_all, fields(queue = %queue.name(), worker = id))]
async fn run_worker<T, H>(
    id: usize,
    queue: Arc<ChannelQueue>,
    handler: Arc<H>,
    batch_length: usize,
    shutdown: CancellationToken,
) -> usize
where
    T: Serialize + DeserializeOwned + Send + 'static,
    H: Handler<T>,
{
    debug!("Worker started");
    let mut backlog: VecDeque<T> = VecDeque::new();

    loop {
        // Buffered items would otherwise keep a worker busy after shutdown.
        if shutdown.is_cancelled() {
            debug!("Shutdown signal received, stopping worker");
            break;
        }

        let take = backlog.len().min(batch_length);
        let mut items: Vec<T> = backlog.drain(..take).collect();

        // Only wait for new work when there is nothing to retry.
        if items.is_empty() {
            match queue.pop(&shutdown).await {
                Ok(payload) => items.extend(decode_batch::<T>(vec![payload])),
                Err(QueueError::Cancelled) => {
                    debug!("Shutdown signal received, stopping worker");
                    break;
                }
                Err(QueueError::ChannelClosed) => {
                    debug!("Queue closed, stopping worker");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Unexpected error popping from queue");
                    break;
                }
            }
        }

        let room = batch_length.saturating_sub(items.len());
        let payloads: Vec<Vec<u8>> = std::iter::from_fn(|| queue.try_pop()).take(room).collect();
        items.extend(decode_batch::<T>(payloads));
        if items.is_empty() {
            continue;
        }

        trace!(batch = items.len(), "Handling batch");
        let unhandled = handler.handle(items).await;
        if !unhandled.is_empty() {
            debug!(count = unhandled.len(), "Keeping unhandled items for the next batch");
            backlog.extend(unhandled);
            // A handler that rejects without awaiting must not starve the runtime.
            tokio::task::yield_now().await;
        }
    }

    if !backlog.is_empty() {
        debug!(count = backlog.len(), "Worker stopped with unhandled items");
    }
    backlog.len()
}

/// Decodes payloads, logging and dropping any that are malformed.
pub(super) fn decode_batch<T: DeserializeOwned>(payloads: Vec<Vec<u8>>) -> Vec<T> {
    payloads
        .into_iter()
        .filter_map(|payload| match serde_json::from_slice(&payload) {
            Ok(item) => Some(item),
            Err(e) => {
                error!(error = %e, len = payload.len(), "Unable to decode queue item, dropping it");
                None
            }
        })
        .collect()
}
