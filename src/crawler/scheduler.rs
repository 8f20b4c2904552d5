//! Scheduler for managing the crawl work queue
//!
//! This module handles:
//! - The FIFO queue of claimed URLs waiting to be fetched
//! - Tracking how many leased items are still being processed
//! - Detecting the end of a run (queue empty and nothing in flight)
//! - Waking idle workers when work arrives or the run ends

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Number of links followed from the seed to reach this URL
    pub depth: u32,
}

impl QueuedUrl {
    /// The seed entry
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<QueuedUrl>,
    in_flight: usize,
    closed: bool,
}

/// Shared work queue drained by the worker pool
///
/// Items are handed out as `Lease`s. A run is finished once nothing is
/// pending and every lease has been dropped; at that point the queue closes
/// itself and every waiting worker is released.
#[derive(Debug, Default)]
pub struct Scheduler {
    state: Mutex<QueueState>,
    notify: Notify,
}

/// A queued URL handed to one worker
///
/// Dropping the lease marks the item as processed, so a worker must push
/// the URLs it discovered before letting the lease go.
#[derive(Debug)]
pub struct Lease<'a> {
    scheduler: &'a Scheduler,
    item: QueuedUrl,
}

impl Lease<'_> {
    /// The leased item
    pub fn item(&self) -> &QueuedUrl {
        &self.item
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.scheduler.complete();
    }
}

impl Scheduler {
    /// Creates a scheduler with an initial queue
    pub fn new(initial: Vec<QueuedUrl>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: initial.into(),
                in_flight: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a URL to the back of the queue
    ///
    /// Returns false if the queue is already closed.
    pub fn push(&self, item: QueuedUrl) -> bool {
        {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            tracing::trace!("Queued {} at depth {}", item.url, item.depth);
            state.pending.push_back(item);
        }
        self.notify.notify_one();
        true
    }

    /// Waits for the next URL
    ///
    /// # Returns
    ///
    /// * `Some(Lease)` - A URL to process
    /// * `None` - The run is over: the queue is drained or was closed
    pub async fn next(&self) -> Option<Lease<'_>> {
        loop {
            // Register interest before inspecting the state so a wakeup sent
            // between the check and the await is not lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }

                if let Some(item) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(Lease {
                        scheduler: self,
                        item,
                    });
                }

                if state.in_flight == 0 {
                    state.closed = true;
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    fn complete(&self) {
        let finished = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            let finished = state.in_flight == 0 && state.pending.is_empty();
            if finished {
                state.closed = true;
            }
            finished
        };

        if finished {
            tracing::trace!("Work queue drained");
            self.notify.notify_waiters();
        }
    }

    /// Closes the queue: pending items are dropped and waiters released
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.pending.clear();
        }
        self.notify.notify_waiters();
    }

    /// Returns the number of URLs waiting in the queue
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Returns the number of leases not yet dropped
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Returns whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
