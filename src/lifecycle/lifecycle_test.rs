use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{Lifecycle, LifecycleEvent};
use crate::lease::{GrantStatus, LeaseCoordinator};
use crate::support::{tracked_task, tracked_work, FakeEnvironment, Outcome};

fn expired_coordinator() -> LeaseCoordinator {
    let env = FakeEnvironment::new();
    let coordinator = LeaseCoordinator::new("TestLease", env.clone());
    let outcome = Outcome::new();
    coordinator.perform(tracked_task("a", &outcome), tracked_work(&outcome));
    env.revoke_latest();
    assert_eq!(coordinator.state(), GrantStatus::Expired);
    coordinator
}

#[test]
fn test_every_transition_resumes() {
    let events = [
        LifecycleEvent::Launched { foreground: true },
        LifecycleEvent::DidEnterBackground,
        LifecycleEvent::WillEnterForeground,
        LifecycleEvent::DidBecomeActive,
    ];

    for event in events {
        let coordinator = expired_coordinator();
        let lifecycle = Lifecycle::new(coordinator.clone());

        assert!(lifecycle.observe(event), "{:?} should resume", event);
        assert_eq!(coordinator.state(), GrantStatus::Absent, "{:?}", event);
    }
}

#[test]
fn test_background_launch_does_not_resume() {
    let coordinator = expired_coordinator();
    let lifecycle = Lifecycle::new(coordinator.clone());

    assert!(!lifecycle.observe(LifecycleEvent::Launched { foreground: false }));
    assert_eq!(coordinator.state(), GrantStatus::Expired);
}

#[tokio::test]
async fn test_listen_forwards_events_from_channel() {
    let coordinator = expired_coordinator();
    let lifecycle = Lifecycle::new(coordinator.clone());
    let (tx, rx) = Lifecycle::channel(4);
    let token = CancellationToken::new();

    let listener = tokio::spawn({
        let lifecycle = lifecycle.clone();
        let token = token.clone();
        async move { lifecycle.listen(token, rx).await }
    });

    tx.send(LifecycleEvent::WillEnterForeground).await.unwrap();
    drop(tx);

    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("listener should stop when the channel closes")
        .unwrap();
    assert_eq!(coordinator.state(), GrantStatus::Absent);
}

#[tokio::test]
async fn test_listen_stops_on_cancellation() {
    let coordinator = expired_coordinator();
    let lifecycle = Lifecycle::new(coordinator);
    let (_tx, rx) = Lifecycle::channel(1);
    let token = CancellationToken::new();

    let listener = tokio::spawn({
        let token = token.clone();
        async move { lifecycle.listen(token, rx).await }
    });
    token.cancel();

    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("listener should stop on cancellation")
        .unwrap();
}
