// Main leasekeeper application implementation.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, ConfigTrait};
use crate::deferred::{self, DeferredOutcome};
use crate::environment::SimulatedPlatform;
use crate::lease::{telemetry, LeaseCoordinator};
use crate::lifecycle::{Lifecycle, LifecycleEvent};

/// Tally of deferred action outcomes from one demo run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoReport {
    pub completed: usize,
    pub cancelled: usize,
    pub refused: usize,
}

impl DemoReport {
    fn record(&mut self, outcome: DeferredOutcome) {
        match outcome {
            DeferredOutcome::Completed => self.completed += 1,
            DeferredOutcome::Cancelled => self.cancelled += 1,
            DeferredOutcome::Refused => self.refused += 1,
        }
    }
}

/// Encapsulates the platform, the coordinator and the lifecycle wiring.
#[derive(Clone)]
pub struct App {
    cfg: Config,
    shutdown_token: CancellationToken,
    platform: Arc<SimulatedPlatform>,
    coordinator: LeaseCoordinator,
    lifecycle: Lifecycle,
    events: mpsc::Sender<LifecycleEvent>,
    events_rx: Arc<parking_lot::Mutex<Option<mpsc::Receiver<LifecycleEvent>>>>,
}

impl App {
    /// Creates a new application instance. Must be called inside a tokio runtime.
    pub fn new(shutdown_token: CancellationToken, cfg: Config) -> Result<Self> {
        let platform = SimulatedPlatform::new(shutdown_token.clone(), cfg.platform())?;
        let coordinator = LeaseCoordinator::new(cfg.lease_name(), platform.clone());
        let lifecycle = Lifecycle::new(coordinator.clone());
        let (events, events_rx) = Lifecycle::channel(16);

        Ok(Self {
            cfg,
            shutdown_token,
            platform,
            coordinator,
            lifecycle,
            events,
            events_rx: Arc::new(parking_lot::Mutex::new(Some(events_rx))),
        })
    }

    pub fn coordinator(&self) -> &LeaseCoordinator {
        &self.coordinator
    }

    pub fn platform(&self) -> &Arc<SimulatedPlatform> {
        &self.platform
    }

    /// Starts the background loops: lifecycle listener and telemetry logger.
    pub fn serve(&self) {
        if let Some(events_rx) = self.events_rx.lock().take() {
            let lifecycle = self.lifecycle.clone();
            let token = self.shutdown_token.clone();
            tokio::spawn(async move {
                lifecycle.listen(token, events_rx).await;
            });
        } else {
            warn!(
                component = "app",
                event = "already_serving",
                "lifecycle listener already started"
            );
        }

        let telemetry_cfg = self.cfg.telemetry();
        if telemetry_cfg.enabled {
            let token = self.shutdown_token.clone();
            let coordinator = self.coordinator.clone();
            let each = telemetry_cfg.interval;
            tokio::spawn(async move {
                telemetry::logger(token, coordinator, each).await;
            });
        }

        info!(
            component = "app",
            event = "started",
            lease = %self.coordinator.name(),
            budget = %humantime::format_duration(self.cfg.platform().budget),
            "application lifecycle"
        );
    }

    /// Applies a host transition before returning. Transitions back to the
    /// foreground also restore the simulated platform. Returns whether the
    /// coordinator was resumed.
    pub fn notify(&self, event: LifecycleEvent) -> bool {
        if matches!(
            event,
            LifecycleEvent::WillEnterForeground | LifecycleEvent::DidBecomeActive
        ) {
            self.platform.restore();
        }
        self.lifecycle.observe(event)
    }

    /// Sender for hosts reporting transitions from other threads. Events are
    /// applied asynchronously by the listener started in [`serve`](Self::serve).
    pub fn events(&self) -> mpsc::Sender<LifecycleEvent> {
        self.events.clone()
    }

    /// Launches, moves to the background and schedules the configured
    /// deferred actions, then waits for every outcome.
    pub async fn run_demo(&self) -> DemoReport {
        let demo = self.cfg.demo().clone();

        self.notify(LifecycleEvent::Launched { foreground: true });
        self.notify(LifecycleEvent::DidEnterBackground);

        let mut handles = Vec::with_capacity(demo.tasks);
        for i in 0..demo.tasks {
            if i > 0 && !demo.spacing.is_zero() {
                tokio::time::sleep(demo.spacing).await;
            }

            let name = format!("DeferredAction-{}", i + 1);
            let label = name.clone();
            let handle = deferred::schedule(&self.coordinator, name, demo.delay, move || {
                info!(component = "demo", event = "action_ran", task = %label, "deferred action ran");
            });
            handles.push(handle);
        }

        let mut report = DemoReport::default();
        for handle in handles {
            let name = handle.task().name().to_string();
            let outcome = handle.outcome().await;
            info!(
                component = "demo",
                event = "outcome",
                task = %name,
                outcome = outcome.as_str(),
                "deferred action finished"
            );
            report.record(outcome);
        }

        if report.cancelled + report.refused > 0 {
            self.notify(LifecycleEvent::WillEnterForeground);
            self.notify(LifecycleEvent::DidBecomeActive);
        }

        report
    }

    /// Cancels background loops.
    pub fn close(&self) {
        self.shutdown_token.cancel();
        info!(component = "app", event = "stopped", "application lifecycle");
    }
}
