// Simulated platform that grants extensions with a fixed time budget.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AcquireError, Environment, GrantHandle, RevocationHandler};
use crate::config::Platform as PlatformCfg;

struct Outstanding {
    name: String,
    cancel: CancellationToken,
}

/// Hands out extensions that are revoked once their budget elapses.
///
/// After a revocation fires the platform considers the process suspended and
/// refuses every request with [`AcquireError::Revoked`] until [`restore`] is
/// called (the process came back to the foreground).
///
/// [`restore`]: SimulatedPlatform::restore
pub struct SimulatedPlatform {
    shutdown_token: CancellationToken,
    runtime: Handle,
    enabled: bool,
    budget: Duration,
    capacity: usize,
    next_id: AtomicU64,
    suspended: Arc<AtomicBool>,
    outstanding: Arc<Mutex<HashMap<u64, Outstanding>>>,
}

impl SimulatedPlatform {
    /// Creates a new platform. Must be called from within a tokio runtime.
    pub fn new(shutdown_token: CancellationToken, cfg: &PlatformCfg) -> Result<Arc<Self>> {
        let runtime = Handle::try_current()
            .context("simulated platform requires a running tokio runtime")?;

        Ok(Arc::new(Self {
            shutdown_token,
            runtime,
            enabled: cfg.enabled,
            budget: cfg.budget,
            capacity: cfg.capacity.max(1),
            next_id: AtomicU64::new(1),
            suspended: Arc::new(AtomicBool::new(false)),
            outstanding: Arc::new(Mutex::new(HashMap::with_capacity(4))),
        }))
    }

    /// Number of extensions granted and not yet released or revoked.
    pub fn outstanding(&self) -> usize {
        self.outstanding.lock().len()
    }

    /// Whether a revocation has suspended the platform.
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    /// Makes the extension capability available again after a suspension.
    pub fn restore(&self) {
        if self.suspended.swap(false, Ordering::AcqRel) {
            info!(
                component = "platform",
                event = "restored",
                "extension capability restored"
            );
        }
    }

    fn arm_budget(&self, id: u64, cancel: CancellationToken, on_revoked: RevocationHandler) {
        let budget = self.budget;
        let shutdown_token = self.shutdown_token.clone();
        let outstanding = self.outstanding.clone();
        let suspended = self.suspended.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(budget) => {}
                _ = cancel.cancelled() => return,
                _ = shutdown_token.cancelled() => return,
            }

            // Whoever removes the entry first owns it; a release racing with
            // the timer wins silently.
            let Some(entry) = outstanding.lock().remove(&id) else {
                return;
            };

            suspended.store(true, Ordering::Release);
            warn!(
                component = "platform",
                event = "extension_revoked",
                grant = id,
                name = %entry.name,
                budget = %humantime::format_duration(budget),
                "extension budget exhausted, revoking"
            );
            on_revoked();
        });
    }
}

impl Environment for SimulatedPlatform {
    fn request_extension(
        &self,
        name: &str,
        on_revoked: RevocationHandler,
    ) -> Result<GrantHandle, AcquireError> {
        if !self.enabled {
            return Err(AcquireError::Unsupported);
        }
        if self.is_suspended() {
            return Err(AcquireError::Revoked);
        }

        let id = {
            let mut outstanding = self.outstanding.lock();
            if outstanding.len() >= self.capacity {
                return Err(AcquireError::AtCapacity {
                    capacity: self.capacity,
                });
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let cancel = self.shutdown_token.child_token();
            outstanding.insert(
                id,
                Outstanding {
                    name: name.to_string(),
                    cancel: cancel.clone(),
                },
            );
            self.arm_budget(id, cancel, on_revoked);
            id
        };

        debug!(
            component = "platform",
            event = "extension_granted",
            grant = id,
            name = %name,
            "extension granted"
        );

        Ok(GrantHandle::new(id))
    }

    fn release_extension(&self, handle: GrantHandle) {
        match self.outstanding.lock().remove(&handle.raw()) {
            Some(entry) => {
                entry.cancel.cancel();
                debug!(
                    component = "platform",
                    event = "extension_released",
                    grant = handle.raw(),
                    name = %entry.name,
                    "extension released"
                );
            }
            None => {
                debug!(
                    component = "platform",
                    event = "release_unknown",
                    grant = handle.raw(),
                    "release of unknown or already revoked extension ignored"
                );
            }
        }
    }
}
