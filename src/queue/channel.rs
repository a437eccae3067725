//! Bounded in-memory channel queue.
//!
//! A fixed-capacity FIFO of byte payloads shared by any number of producers
//! and consumers. In unique mode a payload is rejected while an equal payload
//! is still buffered.
//!
//! # Synchronisation
//!
//! Free slots are tracked by a [`Semaphore`] with `capacity` permits. A push
//! first waits for a permit with no lock held, then takes the state lock
//! and, in one critical section, re-checks the close flag, records the
//! payload in the membership set and appends it to the buffer. A pop removes
//! the front payload and its membership entry in one critical section and
//! hands the permit back. The state lock is never held across an `.await`.
//!
//! Two concurrent pushes of the same payload can both reserve a slot, but
//! only the first one to reach the critical section is admitted; the other
//! fails with [`QueueError::AlreadyInQueue`] and returns its permit.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::types::Set;

use super::config::QueueSettings;
use super::error::{ConfigError, QueueError, Result};

/// Longest time a push waits for a free slot before giving up.
///
/// Keeps producers live when consumers have stalled.
pub const PUSH_BLOCK_TIME: Duration = Duration::from_secs(5);

/// State guarded by the queue lock.
#[derive(Debug)]
struct ChannelState {
    buffer: VecDeque<Vec<u8>>,

    /// Present iff the queue is unique. Mirrors `buffer` exactly.
    members: Option<Set<Vec<u8>>>,

    closed: bool,
}

impl ChannelState {
    fn is_member(&self, payload: &[u8]) -> bool {
        self.members
            .as_ref()
            .is_some_and(|members| members.contains(payload))
    }
}

/// A bounded FIFO of byte payloads with optional unique admission.
///
/// Created with [`ChannelQueue::new`]; share it behind an `Arc`.
#[derive(Debug)]
pub struct ChannelQueue {
    name: String,
    capacity: usize,
    state: Mutex<ChannelState>,

    /// One permit per free slot.
    slots: Semaphore,

    /// Signalled on every admission and on close.
    items: Notify,
}

impl ChannelQueue {
    /// Creates a queue from `settings`, in unique mode iff `settings.unique`.
    ///
    /// Only `name`, `capacity` and `unique` are read.
    pub fn new(settings: &QueueSettings) -> std::result::Result<Self, ConfigError> {
        settings.validate_capacity()?;

        debug!(
            queue = %settings.name,
            capacity = settings.capacity,
            unique = settings.unique,
            "Creating channel queue"
        );

        Ok(ChannelQueue {
            name: settings.name.clone(),
            capacity: settings.capacity,
            state: Mutex::new(ChannelState {
                buffer: VecDeque::new(),
                members: settings.unique.then(Set::new),
                closed: false,
            }),
            slots: Semaphore::new(settings.capacity),
            items: Notify::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the maximum number of buffered payloads.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if duplicate payloads are rejected.
    pub fn is_unique(&self) -> bool {
        self.state().members.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Appends `payload` to the queue.
    ///
    /// Waits while the queue is full, until a slot frees up, `cancel` fires
    /// ([`QueueError::Cancelled`]), or [`PUSH_BLOCK_TIME`] elapses
    /// ([`QueueError::DeadlineExceeded`]). Cancellation is preferred when
    /// several of these are ready at once.
    ///
    /// # Errors
    ///
    /// - [`QueueError::ChannelClosed`] if the queue is or becomes closed.
    /// - [`QueueError::AlreadyInQueue`] in unique mode if an equal payload is
    ///   buffered.
    pub async fn push(&self, cancel: &CancellationToken, payload: Vec<u8>) -> Result<()> {
        // Fail fast without waiting for a slot.
        {
            let state = self.state();
            if state.closed {
                return Err(QueueError::ChannelClosed);
            }
            if state.is_member(&payload) {
                return Err(QueueError::AlreadyInQueue);
            }
        }

        let permit = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                trace!(queue = %self.name, "Push cancelled while waiting for a slot");
                return Err(QueueError::Cancelled);
            }
            permit = self.slots.acquire() => {
                permit.map_err(|_| QueueError::ChannelClosed)?
            }
            _ = tokio::time::sleep(PUSH_BLOCK_TIME) => {
                debug!(queue = %self.name, "Push timed out waiting for a slot");
                return Err(QueueError::DeadlineExceeded(PUSH_BLOCK_TIME));
            }
        };

        {
            let mut state = self.state();
            if state.closed {
                return Err(QueueError::ChannelClosed);
            }
            if let Some(members) = state.members.as_mut()
                && !members.add(payload.clone())
            {
                return Err(QueueError::AlreadyInQueue);
            }
            state.buffer.push_back(payload);
            // The slot stays occupied until a pop or drain hands it back.
            permit.forget();
        }

        self.items.notify_one();
        Ok(())
    }

    /// Removes and returns the oldest payload.
    ///
    /// Waits while the queue is empty, until a payload is admitted, the
    /// queue is closed, or `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`QueueError::ChannelClosed`] once the queue is closed and empty.
    /// - [`QueueError::Cancelled`] if `cancel` fires first.
    pub async fn pop(&self, cancel: &CancellationToken) -> Result<Vec<u8>> {
        loop {
            // Register interest before inspecting the state so an admission
            // or close between the check and the await is not missed.
            let notified = self.items.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state();
                if let Some(payload) = self.take_front(&mut state) {
                    return Ok(payload);
                }
                if state.closed {
                    return Err(QueueError::ChannelClosed);
                }
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    trace!(queue = %self.name, "Pop cancelled while waiting for an item");
                    return Err(QueueError::Cancelled);
                }
                _ = &mut notified => {}
            }
        }
    }

    /// Removes and returns the oldest payload if one is buffered.
    pub fn try_pop(&self) -> Option<Vec<u8>> {
        let mut state = self.state();
        self.take_front(&mut state)
    }

    /// Returns true if an equal payload is buffered.
    ///
    /// Always false for non-unique queues, which do not track membership,
    /// and for closed queues.
    pub fn has(&self, payload: &[u8]) -> bool {
        let state = self.state();
        !state.closed && state.is_member(payload)
    }

    /// Returns the number of buffered payloads, or 0 once closed.
    pub fn len(&self) -> usize {
        let state = self.state();
        if state.closed { 0 } else { state.buffer.len() }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes the queue.
    ///
    /// Pending and future pushes fail with [`QueueError::ChannelClosed`].
    /// Buffered payloads stay poppable; after that pops fail with
    /// [`QueueError::ChannelClosed`]. The membership set is cleared.
    ///
    /// # Errors
    ///
    /// [`QueueError::ChannelClosed`] if the queue was already closed.
    pub fn close(&self) -> Result<()> {
        {
            let mut state = self.state();
            if state.closed {
                return Err(QueueError::ChannelClosed);
            }
            state.closed = true;
            if let Some(members) = state.members.as_mut() {
                members.clear();
            }
        }

        self.slots.close();
        self.items.notify_waiters();
        debug!(queue = %self.name, "Closed channel queue");
        Ok(())
    }

    /// Discards every buffered payload and clears the membership set.
    ///
    /// The queue stays open. Returns the number of payloads discarded.
    ///
    /// # Errors
    ///
    /// [`QueueError::ChannelClosed`] if the queue is closed; buffered
    /// payloads are left in place for consumers.
    pub fn drain(&self) -> Result<usize> {
        let discarded = {
            let mut state = self.state();
            if state.closed {
                return Err(QueueError::ChannelClosed);
            }
            let discarded = state.buffer.len();
            state.buffer.clear();
            if let Some(members) = state.members.as_mut() {
                members.clear();
            }
            discarded
        };

        self.slots.add_permits(discarded);
        debug!(queue = %self.name, discarded, "Drained channel queue");
        Ok(discarded)
    }

    /// Pops the front payload under an already-held lock.
    fn take_front(&self, state: &mut ChannelState) -> Option<Vec<u8>> {
        let payload = state.buffer.pop_front()?;
        if let Some(members) = state.members.as_mut()
            && !members.remove(payload.as_slice())
        {
            error!(
                queue = %self.name,
                len = payload.len(),
                "Popped item was missing from the membership set"
            );
        }
        self.slots.add_permits(1);
        Some(payload)
    }

    fn state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
