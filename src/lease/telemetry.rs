// Package lease provides telemetry for the lease coordinator.

use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use super::coordinator::LeaseCoordinator;
use crate::metrics;

/// Periodically flushes coordinator counters to the metrics facade and logs
/// one stats line per tick. Returns when `shutdown_token` is cancelled.
pub async fn logger(shutdown_token: CancellationToken, coordinator: LeaseCoordinator, each: Duration) {
    let mut ticker = interval(each);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                tracing::debug!(svc = "lease", name = %coordinator.name(), "logger stopped");
                return;
            }
            _ = ticker.tick() => {
                let stats = coordinator.counters().reset();
                let grant = coordinator.state();
                let tasks = coordinator.active_tasks();

                metrics::add_lease_stat_counters(&stats);
                metrics::set_lease_state(grant.is_active(), tasks);

                tracing::info!(
                    grant = %grant,
                    tasks = tasks,
                    acquired = stats.acquisitions,
                    acquire_failed = stats.acquisition_failures,
                    released = stats.releases,
                    revoked = stats.revocations,
                    performed = stats.performed,
                    refused = stats.refused,
                    expired = stats.expired,
                    ended = stats.ended,
                    name = %coordinator.name(),
                    "lease coordinator stats"
                );
            }
        }
    }
}
