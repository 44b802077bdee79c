// Package shutdown provides graceful shutdown functionality.

use anyhow::Result;
use std::time::Duration;
use tokio::signal;
use tokio::time::{interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::lease::LeaseCoordinator;


const DRAIN_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
#[error("graceful shutdown timeout exceeded with {remaining} task(s) still registered")]
pub struct TimeoutError {
    pub remaining: usize,
}

/// Graceful shutdown handler.
/// Waits for a signal, then gives registered tasks time to end.
#[derive(Clone)]
pub struct GracefulShutdown {
    shutdown_token: CancellationToken,
    timeout: Duration,
    coordinator: LeaseCoordinator,
}

impl GracefulShutdown {
    /// Creates a new graceful shutdown handler
    pub fn new(shutdown_token: CancellationToken, coordinator: LeaseCoordinator, timeout: Duration) -> Self {
        Self {
            shutdown_token,
            timeout,
            coordinator,
        }
    }

    /// Waits for shutdown signal and then waits for all tasks to end
    pub async fn await_shutdown(&self) -> Result<()> {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!(
                    component = "graceful-shutdown",
                    event = "os_signal",
                    signal = "SIGINT",
                    "cancellation started"
                );
            }
            _ = self.shutdown_token.cancelled() => {
                info!(
                    component = "graceful-shutdown",
                    event = "ctx_done",
                    "cancellation started"
                );
            }
        }

        self.cancel_and_drain().await
    }

    /// Cancels the root token and waits, bounded by the timeout, until the
    /// coordinator has no registered task left.
    pub async fn cancel_and_drain(&self) -> Result<()> {
        self.shutdown_token.cancel();

        match timeout(self.timeout, self.wait_for_drain()).await {
            Ok(_) => {
                info!(
                    component = "graceful-shutdown",
                    event = "shutdown_success",
                    "service was gracefully shut down"
                );
                Ok(())
            }
            Err(_) => {
                let remaining = self.coordinator.active_tasks();
                warn!(
                    component = "graceful-shutdown",
                    event = "shutdown_timeout",
                    timeout = %humantime::format_duration(self.timeout),
                    remaining,
                    "not all tasks ended within timeout"
                );
                Err(TimeoutError { remaining }.into())
            }
        }
    }

    async fn wait_for_drain(&self) {
        let mut ticker = interval(DRAIN_POLL);
        loop {
            ticker.tick().await;
            if self.coordinator.active_tasks() == 0 {
                return;
            }
        }
    }
}
