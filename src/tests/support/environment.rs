// Recording environment double for coordinator tests.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::environment::{AcquireError, Environment, GrantHandle, RevocationHandler};

/// Environment that records every call and lets the test decide when a grant
/// is revoked.
pub struct FakeEnvironment {
    next_id: AtomicU64,
    requests: AtomicUsize,
    releases: Mutex<Vec<GrantHandle>>,
    refuse: Mutex<Option<AcquireError>>,
    pending: Mutex<Vec<(GrantHandle, RevocationHandler)>>,
    names: Mutex<Vec<String>>,
}

impl FakeEnvironment {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            requests: AtomicUsize::new(0),
            releases: Mutex::new(Vec::new()),
            refuse: Mutex::new(None),
            pending: Mutex::new(Vec::new()),
            names: Mutex::new(Vec::new()),
        })
    }

    /// Makes every following request fail with `err`.
    pub fn refuse_with(&self, err: AcquireError) {
        *self.refuse.lock() = Some(err);
    }

    /// Lets requests succeed again.
    pub fn accept(&self) {
        *self.refuse.lock() = None;
    }

    /// Number of `request_extension` calls, successful or not.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Handles released so far, in release order.
    pub fn releases(&self) -> Vec<GrantHandle> {
        self.releases.lock().clone()
    }

    /// Names passed to `request_extension`.
    pub fn names(&self) -> Vec<String> {
        self.names.lock().clone()
    }

    /// Handle of the most recent successful grant still revocable.
    pub fn last_grant(&self) -> Option<GrantHandle> {
        self.pending.lock().last().map(|(handle, _)| *handle)
    }

    /// Fires the revocation handler of the most recent grant, as the
    /// environment would when the extension runs out. Returns false if no
    /// grant was revocable.
    pub fn revoke_latest(&self) -> bool {
        // Take the handler out first: it re-enters the coordinator, which may
        // call back into `release_extension`.
        let handler = self.pending.lock().pop().map(|(_, handler)| handler);
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Takes the handler of the most recent grant without firing it.
    pub fn take_latest_handler(&self) -> Option<RevocationHandler> {
        self.pending.lock().pop().map(|(_, handler)| handler)
    }
}

impl Environment for FakeEnvironment {
    fn request_extension(
        &self,
        name: &str,
        on_revoked: RevocationHandler,
    ) -> Result<GrantHandle, AcquireError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.names.lock().push(name.to_string());

        if let Some(err) = self.refuse.lock().clone() {
            return Err(err);
        }

        let handle = GrantHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.pending.lock().push((handle, on_revoked));
        Ok(handle)
    }

    fn release_extension(&self, handle: GrantHandle) {
        self.releases.lock().push(handle);
        // A released grant can no longer be revoked.
        self.pending.lock().retain(|(pending, _)| *pending != handle);
    }
}
