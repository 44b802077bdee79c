//! Cancellable deferred actions backed by the lease coordinator.
//!
//! An action is scheduled to run after a delay while the shared grant keeps
//! the process alive. If the grant is revoked first, the action is cancelled
//! and never runs.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::lease::{LeaseCoordinator, Task};


/// How a deferred action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredOutcome {
    /// The action ran and its task was ended.
    Completed,
    /// The grant was revoked while the action was waiting.
    Cancelled,
    /// The coordinator refused the task; the action was never scheduled.
    Refused,
}

impl DeferredOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferredOutcome::Completed => "completed",
            DeferredOutcome::Cancelled => "cancelled",
            DeferredOutcome::Refused => "refused",
        }
    }
}

type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<DeferredOutcome>>>>;

/// Handle to a scheduled action.
pub struct DeferredHandle {
    task: Arc<Task>,
    cancel: CancellationToken,
    rx: oneshot::Receiver<DeferredOutcome>,
}

impl DeferredHandle {
    pub fn task(&self) -> &Arc<Task> {
        &self.task
    }

    /// Whether the action has been cancelled (or refused).
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the action to complete, be cancelled or be refused.
    pub async fn outcome(self) -> DeferredOutcome {
        // A dropped sender means the runtime went away before the action ran.
        self.rx.await.unwrap_or(DeferredOutcome::Cancelled)
    }
}

/// Schedules `action` to run after `delay` under the coordinator's grant.
///
/// Must be called from within a tokio runtime. Whichever of completion and
/// expiration claims the outcome first wins: a cancelled action never runs,
/// a running action is reported as completed.
pub fn schedule<F>(
    coordinator: &LeaseCoordinator,
    name: impl Into<String>,
    delay: Duration,
    action: F,
) -> DeferredHandle
where
    F: FnOnce() + Send + 'static,
{
    let cancel = CancellationToken::new();
    let started = Arc::new(AtomicBool::new(false));
    let (tx, rx) = oneshot::channel();
    let slot: OutcomeSlot = Arc::new(Mutex::new(Some(tx)));

    let task = Task::new(name, {
        let cancel = cancel.clone();
        let started = started.clone();
        let slot = slot.clone();
        move || {
            cancel.cancel();
            if let Some(tx) = slot.lock().take() {
                let outcome = if started.load(Ordering::Acquire) {
                    DeferredOutcome::Cancelled
                } else {
                    DeferredOutcome::Refused
                };
                let _ = tx.send(outcome);
            }
        }
    });

    let work = {
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        move |task: Arc<Task>| {
            started.store(true, Ordering::Release);
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return,
                }

                let Some(tx) = slot.lock().take() else {
                    return;
                };
                action();
                coordinator.end_task(&task);
                debug!(
                    component = "deferred",
                    event = "completed",
                    task = %task.name(),
                    id = %task.id(),
                    "deferred action completed"
                );
                let _ = tx.send(DeferredOutcome::Completed);
            });
        }
    };

    coordinator.perform(task.clone(), work);

    DeferredHandle { task, cancel, rx }
}
