//! Admission gate: a fixed-capacity counting semaphore.
//!
//! `acquire` waits until fewer than `capacity` slots are occupied and takes
//! one. The returned [`GatePermit`] frees the slot when dropped, so every
//! exit path of a worker (normal return, early skip, panic) gives it back.

use crate::error::{Error, Result};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::trace;

/// Counting semaphore limiting how many worker bodies run at once.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    occupied: AtomicUsize,
    released: Notify,
}

impl AdmissionGate {
    /// Create a gate with `capacity` slots. Capacity is fixed for the gate's life.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            occupied: AtomicUsize::new(0),
            released: Notify::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held. Always in `0..=capacity`.
    pub fn occupied(&self) -> usize {
        self.occupied.load(Ordering::Acquire)
    }

    /// Wait for a free slot and occupy it.
    ///
    /// No ordering is promised among concurrent waiters.
    pub async fn acquire(self: &Arc<Self>) -> GatePermit {
        loop {
            // Register interest before checking, so a release between the
            // check and the await still wakes us.
            let mut notified = pin!(self.released.notified());
            notified.as_mut().enable();

            if self.try_occupy() {
                trace!(occupied = self.occupied(), "gate slot acquired");
                return GatePermit {
                    gate: Arc::clone(self),
                };
            }

            notified.await;
        }
    }

    /// Occupy a slot without waiting. Returns `None` when the gate is full.
    pub fn try_acquire(self: &Arc<Self>) -> Option<GatePermit> {
        self.try_occupy().then(|| GatePermit {
            gate: Arc::clone(self),
        })
    }

    fn try_occupy(&self) -> bool {
        self.occupied
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .is_ok()
    }

    fn release(&self) {
        let prev = self.occupied.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "gate released more times than acquired");
        trace!(occupied = prev - 1, "gate slot released");
        self.released.notify_one();
    }
}

/// One occupied gate slot. Released exactly once, on drop.
#[derive(Debug)]
#[must_use = "dropping the permit releases the slot immediately"]
pub struct GatePermit {
    gate: Arc<AdmissionGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
