use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{App, DemoReport};
use crate::config::new_test_config;
use crate::lease::{GrantStatus, Task};
use crate::lifecycle::LifecycleEvent;

#[tokio::test(start_paused = true)]
async fn test_demo_completes_within_budget() {
    let app = App::new(CancellationToken::new(), new_test_config()).unwrap();
    app.serve();

    let report = app.run_demo().await;

    assert_eq!(
        report,
        DemoReport {
            completed: 2,
            cancelled: 0,
            refused: 0
        }
    );
    assert_eq!(app.coordinator().state(), GrantStatus::Absent);
    assert_eq!(app.platform().outstanding(), 0);
    let stats = app.coordinator().snapshot();
    assert_eq!(stats.acquisitions, 1);
    assert_eq!(stats.releases, 1);
    app.close();
}

#[tokio::test(start_paused = true)]
async fn test_demo_cancelled_when_budget_runs_out() {
    let mut cfg = new_test_config();
    cfg.leasekeeper.platform.budget = Duration::from_millis(300);
    let app = App::new(CancellationToken::new(), cfg).unwrap();
    app.serve();

    let report = app.run_demo().await;
    assert_eq!(report.cancelled, 2);
    assert_eq!(report.completed, 0);

    // The demo reports a return to the foreground, which clears the lockout.
    assert_eq!(app.coordinator().state(), GrantStatus::Absent);
    assert!(!app.platform().is_suspended());
    app.close();
}

/// Transitions reported through `notify` take effect before it returns, even
/// on a multi-threaded runtime with no listener running.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_notify_applies_transition_immediately() {
    let mut cfg = new_test_config();
    cfg.leasekeeper.platform.enabled = false;
    let app = App::new(CancellationToken::new(), cfg).unwrap();

    app.coordinator().perform(Task::new("refused", || {}), |_| {});
    assert_eq!(app.coordinator().state(), GrantStatus::Expired);

    assert!(!app.notify(LifecycleEvent::Launched { foreground: false }));
    assert_eq!(app.coordinator().state(), GrantStatus::Expired);

    assert!(app.notify(LifecycleEvent::DidEnterBackground));
    assert_eq!(app.coordinator().state(), GrantStatus::Absent);
    app.close();
}

#[tokio::test(start_paused = true)]
async fn test_events_sender_feeds_listener() {
    let mut cfg = new_test_config();
    cfg.leasekeeper.platform.enabled = false;
    let app = App::new(CancellationToken::new(), cfg).unwrap();
    app.serve();

    app.coordinator().perform(Task::new("refused", || {}), |_| {});
    assert_eq!(app.coordinator().state(), GrantStatus::Expired);

    app.events().send(LifecycleEvent::DidBecomeActive).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(app.coordinator().state(), GrantStatus::Absent);
    app.close();
}
