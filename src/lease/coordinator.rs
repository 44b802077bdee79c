//! Shared-lease coordinator.
//!
//! One external grant, many logical tasks. The first task acquires the grant,
//! later tasks share it, the last task to end releases it. When the
//! environment revokes the grant every registered task is expired and new
//! work is refused until [`LeaseCoordinator::resume`] is called.
//!
//! Every operation runs inside a single critical section. `work` closures and
//! expiration handlers are invoked from inside it, so they must not call back
//! into the coordinator synchronously; schedule the follow-up elsewhere and
//! call [`LeaseCoordinator::end_task`] from there.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use super::counters::{Counters, Snapshot};
use super::grant::{GrantState, GrantStatus};
use super::task::Task;
use crate::environment::{AcquireError, Environment, GrantHandle, RevocationHandler};

struct State {
    grant: GrantState,
    /// Bumped on every acquisition; revocations carry the value they were
    /// armed with so a late callback cannot expire a newer grant.
    epoch: u64,
    tasks: HashSet<Arc<Task>>,
}

struct Inner {
    name: String,
    env: Arc<dyn Environment>,
    state: Mutex<State>,
    counters: Counters,
}

/// Handle to the coordinator. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct LeaseCoordinator {
    inner: Arc<Inner>,
}

impl LeaseCoordinator {
    /// Creates a coordinator requesting grants named `name` from `env`.
    pub fn new(name: impl Into<String>, env: Arc<dyn Environment>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                env,
                state: Mutex::new(State {
                    grant: GrantState::Absent,
                    epoch: 0,
                    tasks: HashSet::with_capacity(8),
                }),
                counters: Counters::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether a grant is currently held. Diagnostics only: decisions are
    /// taken inside [`perform`](Self::perform) and [`end_task`](Self::end_task).
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().grant.is_active()
    }

    /// Current grant status. The grant handle itself is not exposed.
    pub fn state(&self) -> GrantStatus {
        self.inner.state.lock().grant.status()
    }

    #[cfg(test)]
    pub(crate) fn grant(&self) -> GrantState {
        self.inner.state.lock().grant
    }

    /// Number of registered tasks.
    pub fn active_tasks(&self) -> usize {
        self.inner.state.lock().tasks.len()
    }

    /// Whether `task` is currently registered.
    pub fn is_registered(&self, task: &Task) -> bool {
        self.inner.state.lock().tasks.contains(task)
    }

    pub fn counters(&self) -> &Counters {
        &self.inner.counters
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.counters.snapshot()
    }

    /// Clears an expired lockout. No-op in any other state.
    pub fn resume(&self) {
        let mut state = self.inner.state.lock();
        if state.grant == GrantState::Expired {
            state.grant = GrantState::Absent;
            info!(
                component = "lease",
                event = "resumed",
                lease = %self.inner.name,
                "lockout cleared, new tasks accepted"
            );
        }
    }

    /// Runs `work` under the shared grant, or expires `task` if no grant can
    /// be had. Exactly one of the two happens for a task not yet expired.
    pub fn perform<F>(&self, task: Arc<Task>, work: F)
    where
        F: FnOnce(Arc<Task>),
    {
        let mut state = self.inner.state.lock();
        let grant = state.grant;

        match grant {
            GrantState::Expired => {
                Counters::inc(&self.inner.counters.refused);
                debug!(
                    component = "lease",
                    event = "task_refused",
                    task = %task.name(),
                    id = %task.id(),
                    grant = %grant,
                    "grant expired, refusing task"
                );
                if !task.expire() {
                    self.inner.warn_spent(&task);
                }
            }
            GrantState::Active(_) => {
                self.register_and_run(&mut state, task, work);
            }
            GrantState::Absent => match self.inner.acquire(&mut state) {
                Ok(handle) => {
                    info!(
                        component = "lease",
                        event = "grant_acquired",
                        lease = %self.inner.name,
                        grant = %handle,
                        task = %task.name(),
                        "grant acquired"
                    );
                    self.register_and_run(&mut state, task, work);
                }
                Err(err) => {
                    Counters::inc(&self.inner.counters.acquisition_failures);
                    Counters::inc(&self.inner.counters.refused);
                    warn!(
                        component = "lease",
                        event = "grant_refused",
                        lease = %self.inner.name,
                        task = %task.name(),
                        error = %err,
                        "environment refused grant, expiring task"
                    );
                    self.inner.expire_all(&mut state);
                    if !task.expire() {
                        self.inner.warn_spent(&task);
                    }
                }
            },
        }
    }

    /// Unregisters `task` and releases the grant once no task is left.
    /// Unknown or already ended tasks are ignored.
    pub fn end_task(&self, task: &Task) {
        let mut state = self.inner.state.lock();

        if !state.tasks.remove(task) {
            debug!(
                component = "lease",
                event = "end_unknown",
                task = %task.name(),
                id = %task.id(),
                "task not registered, nothing to end"
            );
            return;
        }
        Counters::inc(&self.inner.counters.ended);

        if !state.tasks.is_empty() {
            return;
        }

        if let GrantState::Active(handle) = state.grant {
            self.inner.env.release_extension(handle);
            state.grant = GrantState::Absent;
            Counters::inc(&self.inner.counters.releases);
            info!(
                component = "lease",
                event = "grant_released",
                lease = %self.inner.name,
                grant = %handle,
                "last task ended, grant released"
            );
        }
    }

    fn register_and_run<F>(&self, state: &mut State, task: Arc<Task>, work: F)
    where
        F: FnOnce(Arc<Task>),
    {
        state.tasks.insert(task.clone());
        Counters::inc(&self.inner.counters.performed);
        debug!(
            component = "lease",
            event = "task_started",
            task = %task.name(),
            id = %task.id(),
            active = state.tasks.len(),
            "task registered"
        );
        work(task);
    }
}

impl Inner {
    fn acquire(self: &Arc<Self>, state: &mut State) -> Result<GrantHandle, AcquireError> {
        let epoch = state.epoch.wrapping_add(1);
        let weak: Weak<Inner> = Arc::downgrade(self);
        let on_revoked: RevocationHandler = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.revoke(epoch);
            }
        });

        let handle = self.env.request_extension(&self.name, on_revoked)?;
        state.epoch = epoch;
        state.grant = GrantState::Active(handle);
        Counters::inc(&self.counters.acquisitions);
        Ok(handle)
    }

    /// A refused task whose handler already ran gets neither outcome.
    fn warn_spent(&self, task: &Task) {
        warn!(
            component = "lease",
            event = "task_reused",
            lease = %self.name,
            task = %task.name(),
            id = %task.id(),
            "refused task was already expired, no callback delivered"
        );
    }

    fn revoke(&self, epoch: u64) {
        let mut state = self.state.lock();

        if !state.grant.is_active() || state.epoch != epoch {
            debug!(
                component = "lease",
                event = "stale_revocation",
                lease = %self.name,
                grant = %state.grant,
                "revocation for a grant no longer held, ignoring"
            );
            return;
        }

        Counters::inc(&self.counters.revocations);
        let swept = self.expire_all(&mut state);
        warn!(
            component = "lease",
            event = "grant_revoked",
            lease = %self.name,
            swept,
            "grant revoked, tasks expired and new work locked out"
        );
    }

    /// Expires every registered task, releases the grant if one is held and
    /// locks the coordinator out until resumed. Returns the number of tasks
    /// whose handler ran.
    fn expire_all(&self, state: &mut State) -> usize {
        let tasks = std::mem::take(&mut state.tasks);
        let mut swept = 0;
        for task in tasks {
            if task.expire() {
                swept += 1;
            }
        }
        Counters::add(&self.counters.expired, swept as i64);

        if let Some(handle) = state.grant.handle() {
            self.env.release_extension(handle);
        }
        state.grant = GrantState::Expired;
        swept
    }
}
