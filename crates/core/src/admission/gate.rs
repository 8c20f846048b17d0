use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Error type for admission operations.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The gate was closed; no further batches are admitted.
    #[error("Admission gate is closed")]
    Closed,
}

/// Counters shared by the gate and its outstanding tokens.
#[derive(Default)]
struct GateStats {
    in_flight: AtomicU64,
    waiting: AtomicU64,
    total_admitted: AtomicU64,
}

/// Snapshot of the gate's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissionStats {
    pub capacity: usize,
    pub in_flight: u64,
    pub waiting: u64,
    pub total_admitted: u64,
}

/// Bounded counting gate for concurrent batch processing.
///
/// Cloning is cheap; clones share the same capacity.
#[derive(Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    stats: Arc<GateStats>,
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("capacity", &self.capacity)
            .field("available", &self.semaphore.available_permits())
            .finish()
    }
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` concurrent batches.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            stats: Arc::new(GateStats::default()),
        }
    }

    /// Waits until a slot is free and takes it.
    ///
    /// The wait is not interrupted by request cancellation; dropping the
    /// returned future is the only way to give up on it.
    pub async fn acquire(&self) -> Result<AdmissionToken, AdmissionError> {
        self.stats.waiting.fetch_add(1, Ordering::Relaxed);
        let _waiting = WaitingGuard(&self.stats);

        if self.semaphore.available_permits() == 0 {
            debug!(capacity = self.capacity, "Admission gate full, waiting for a slot");
        }

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| AdmissionError::Closed)?;

        Ok(self.admit(permit))
    }

    /// Takes a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<AdmissionToken> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| self.admit(permit))
    }

    /// Closes the gate. Pending and future acquisitions fail with
    /// `AdmissionError::Closed`; outstanding tokens stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> AdmissionStats {
        AdmissionStats {
            capacity: self.capacity,
            in_flight: self.stats.in_flight.load(Ordering::Relaxed),
            waiting: self.stats.waiting.load(Ordering::Relaxed),
            total_admitted: self.stats.total_admitted.load(Ordering::Relaxed),
        }
    }

    fn admit(&self, permit: OwnedSemaphorePermit) -> AdmissionToken {
        self.stats.in_flight.fetch_add(1, Ordering::Relaxed);
        self.stats.total_admitted.fetch_add(1, Ordering::Relaxed);
        AdmissionToken {
            _permit: permit,
            stats: Arc::clone(&self.stats),
        }
    }
}

/// Decrements the waiting counter however `acquire` ends.
struct WaitingGuard<'a>(&'a GateStats);

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.waiting.fetch_sub(1, Ordering::Relaxed);
    }
}

/// One unit of admission capacity, held for the lifetime of a batch.
///
/// Dropping the token returns the slot to the gate.
#[must_use = "the slot is released as soon as the token is dropped"]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
    stats: Arc<GateStats>,
}

impl AdmissionToken {
    /// Returns the slot to the gate. Equivalent to dropping the token.
    pub fn release(self) {}
}

impl std::fmt::Debug for AdmissionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionToken").finish_non_exhaustive()
    }
}

impl Drop for AdmissionToken {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
