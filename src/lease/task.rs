// Logical unit of work multiplexed onto the shared grant.

use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

type ExpirationHandler = Box<dyn FnOnce() + Send + 'static>;

/// A unit of work and the action to take if the grant is lost before it ends.
///
/// Tasks compare by identity: two tasks with the same name are different
/// tasks. The expiration handler runs at most once no matter how many times
/// [`Task::expire`] is called.
///
/// A task is single-use once expired: handing it to
/// [`LeaseCoordinator::perform`](super::LeaseCoordinator::perform) again while
/// the grant is lost runs neither the work nor a callback. Create a new task.
pub struct Task {
    id: TaskId,
    name: String,
    on_expire: Mutex<Option<ExpirationHandler>>,
}

impl Task {
    /// Creates a new task, ready to be handed to the coordinator.
    pub fn new<F>(name: impl Into<String>, on_expire: F) -> Arc<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        Arc::new(Self {
            id: TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            on_expire: Mutex::new(Some(Box::new(on_expire))),
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the expiration handler has already run.
    pub fn is_expired(&self) -> bool {
        self.on_expire.lock().is_none()
    }

    /// Runs the expiration handler. Returns false if it had already run.
    pub fn expire(&self) -> bool {
        // Take first so the handler runs without the slot locked.
        let handler = self.on_expire.lock().take();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("expired", &self.is_expired())
            .finish()
    }
}
