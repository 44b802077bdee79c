// Outcome recorders shared by the lease tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::lease::Task;

/// Counts how often a task's work ran and how often it was expired.
#[derive(Default)]
pub struct Outcome {
    worked: AtomicUsize,
    expired: AtomicUsize,
}

impl Outcome {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn worked(&self) -> usize {
        self.worked.load(Ordering::SeqCst)
    }

    pub fn expired(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }

    /// Total number of outcomes observed.
    pub fn total(&self) -> usize {
        self.worked() + self.expired()
    }
}

/// Builds a task whose expiration bumps `outcome`.
pub fn tracked_task(name: &str, outcome: &Arc<Outcome>) -> Arc<Task> {
    let outcome = outcome.clone();
    Task::new(name, move || {
        outcome.expired.fetch_add(1, Ordering::SeqCst);
    })
}

/// Builds a work closure that bumps `outcome`.
pub fn tracked_work(outcome: &Arc<Outcome>) -> impl FnOnce(Arc<Task>) {
    let outcome = outcome.clone();
    move |_task| {
        outcome.worked.fetch_add(1, Ordering::SeqCst);
    }
}
