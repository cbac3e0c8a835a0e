//! Completion tracker: a counting barrier over outstanding workers.
//!
//! The coordinator registers a worker before spawning it, never after, so
//! `wait` cannot observe a transient zero while dispatch is still going on.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::error;

#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: AtomicUsize,
    drained: Notify,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered workers that have not yet signalled `done`.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Add `n` outstanding workers.
    pub fn add(&self, n: usize) {
        self.outstanding.fetch_add(n, Ordering::AcqRel);
    }

    /// Mark one worker finished. Wakes waiters when the count reaches zero.
    ///
    /// A `done` with nothing outstanding is refused; the count never goes
    /// negative.
    pub fn done(&self) {
        match self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.drained.notify_waiters(),
            Ok(_) => {}
            Err(_) => error!("completion tracker signalled done with no outstanding workers"),
        }
    }

    /// Register one worker and return a guard that signals `done` on drop.
    pub fn register(self: &Arc<Self>) -> Registration {
        self.add(1);
        Registration {
            tracker: Arc::clone(self),
        }
    }

    /// Wait until no registered worker is outstanding.
    pub async fn wait(&self) {
        loop {
            let mut notified = pin!(self.drained.notified());
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// One registered worker. Signals `done` exactly once, when dropped.
#[derive(Debug)]
#[must_use = "dropping the registration marks the worker done immediately"]
pub struct Registration {
    tracker: Arc<CompletionTracker>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.tracker.done();
    }
}
