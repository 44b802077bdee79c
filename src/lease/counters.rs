// Package lease provides counters for the lease coordinator.

use std::sync::atomic::{AtomicI64, Ordering};

/// Counters for lease coordinator operations.
pub struct Counters {
    /// Grants obtained from the environment.
    pub acquisitions: AtomicI64,
    /// Requests the environment refused.
    pub acquisition_failures: AtomicI64,
    /// Grants handed back after the last task ended.
    pub releases: AtomicI64,
    /// Grants cut short by the environment.
    pub revocations: AtomicI64,
    /// Tasks whose work was started.
    pub performed: AtomicI64,
    /// Tasks refused without running their work.
    pub refused: AtomicI64,
    /// Registered tasks expired by a revocation sweep.
    pub expired: AtomicI64,
    /// Tasks ended by their owner.
    pub ended: AtomicI64,
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub acquisitions: i64,
    pub acquisition_failures: i64,
    pub releases: i64,
    pub revocations: i64,
    pub performed: i64,
    pub refused: i64,
    pub expired: i64,
    pub ended: i64,
}

impl Counters {
    /// Creates new counters.
    pub fn new() -> Self {
        Self {
            acquisitions: AtomicI64::new(0),
            acquisition_failures: AtomicI64::new(0),
            releases: AtomicI64::new(0),
            revocations: AtomicI64::new(0),
            performed: AtomicI64::new(0),
            refused: AtomicI64::new(0),
            expired: AtomicI64::new(0),
            ended: AtomicI64::new(0),
        }
    }

    pub(crate) fn inc(counter: &AtomicI64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicI64, n: i64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Reads all counters without resetting them.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            acquisition_failures: self.acquisition_failures.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            revocations: self.revocations.load(Ordering::Relaxed),
            performed: self.performed.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            ended: self.ended.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters and returns their previous values.
    pub fn reset(&self) -> Snapshot {
        Snapshot {
            acquisitions: self.acquisitions.swap(0, Ordering::Relaxed),
            acquisition_failures: self.acquisition_failures.swap(0, Ordering::Relaxed),
            releases: self.releases.swap(0, Ordering::Relaxed),
            revocations: self.revocations.swap(0, Ordering::Relaxed),
            performed: self.performed.swap(0, Ordering::Relaxed),
            refused: self.refused.swap(0, Ordering::Relaxed),
            expired: self.expired.swap(0, Ordering::Relaxed),
            ended: self.ended.swap(0, Ordering::Relaxed),
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
