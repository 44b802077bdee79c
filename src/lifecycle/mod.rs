//! Host lifecycle notifications forwarded into the coordinator.
//!
//! Extension capability may come back on any of several process transitions,
//! so every one of them resumes the coordinator.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::lease::LeaseCoordinator;

#[cfg(test)]
mod lifecycle_test;

/// Process transitions reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Process finished launching; `foreground` when launched into the foreground.
    Launched { foreground: bool },
    DidEnterBackground,
    WillEnterForeground,
    DidBecomeActive,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Launched { .. } => "launched",
            LifecycleEvent::DidEnterBackground => "did_enter_background",
            LifecycleEvent::WillEnterForeground => "will_enter_foreground",
            LifecycleEvent::DidBecomeActive => "did_become_active",
        }
    }

    /// Whether extension capability is known to be available after this event.
    pub fn restores_capability(&self) -> bool {
        match self {
            LifecycleEvent::Launched { foreground } => *foreground,
            LifecycleEvent::DidEnterBackground
            | LifecycleEvent::WillEnterForeground
            | LifecycleEvent::DidBecomeActive => true,
        }
    }
}

/// Forwards lifecycle events to a [`LeaseCoordinator`].
#[derive(Clone)]
pub struct Lifecycle {
    coordinator: LeaseCoordinator,
}

impl Lifecycle {
    pub fn new(coordinator: LeaseCoordinator) -> Self {
        Self { coordinator }
    }

    /// Handles one event. Returns whether the coordinator was resumed.
    pub fn observe(&self, event: LifecycleEvent) -> bool {
        if !event.restores_capability() {
            debug!(
                component = "lifecycle",
                event = event.as_str(),
                "event does not restore capability, ignoring"
            );
            return false;
        }

        self.coordinator.resume();
        debug!(
            component = "lifecycle",
            event = event.as_str(),
            grant = %self.coordinator.state(),
            "coordinator resumed"
        );
        true
    }

    /// Creates a channel the host can feed from any thread, and the receiver
    /// to hand to [`listen`](Self::listen).
    pub fn channel(buffer: usize) -> (mpsc::Sender<LifecycleEvent>, mpsc::Receiver<LifecycleEvent>) {
        mpsc::channel(buffer.max(1))
    }

    /// Drains `events` until the channel closes or `shutdown_token` is cancelled.
    pub async fn listen(
        &self,
        shutdown_token: CancellationToken,
        mut events: mpsc::Receiver<LifecycleEvent>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    debug!(component = "lifecycle", "listener stopped");
                    return;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            self.observe(event);
                        }
                        None => {
                            info!(component = "lifecycle", "event channel closed, listener stopped");
                            return;
                        }
                    }
                }
            }
        }
    }
}
