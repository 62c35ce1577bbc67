//! Watcher tests

use std::time::Duration;

use captain::watch::{
    Clock, ManualClock, RequestAction, WatchError, WatchOptions, WatchState, WatchTarget, Watcher,
};
use helm_crds::{EventType, HelmRequest, HelmRequestPhase::*};

use crate::stubs::InMemoryCluster;

fn target() -> WatchTarget {
    let mut request = HelmRequest::new("web", "apps");
    request.spec.version = "1.0.0".to_string();
    WatchTarget::new(&request, RequestAction::Created, vec!["a=b".to_string()])
}

fn options(failure_tolerance: u32, timeout: Option<Duration>) -> WatchOptions {
    WatchOptions {
        poll_interval: Duration::from_secs(1),
        timeout,
        failure_tolerance,
    }
}

#[tokio::test]
async fn test_synced_on_first_poll() {
    let cluster = InMemoryCluster::with_phases(vec![Synced]);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, None));

    watcher.watch(&target()).await.unwrap();

    assert_eq!(cluster.fetches(), 1);
    let events = cluster.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Normal);
    assert_eq!(events[0].reason, "Synced");
    assert_eq!(
        events[0].message,
        "Created helmrequest apps/web with version: 1.0.0 values: [a=b]"
    );
    assert_eq!(events[0].subject.name, "web");
}

#[tokio::test]
async fn test_failures_accumulate_across_recoveries() {
    let cluster =
        InMemoryCluster::with_phases(vec![Failed, Pending, Failed, Syncing, Failed, Synced]);
    cluster.set_diagnostics(Some(vec!["pull failed".to_string(), "retrying".to_string()]));
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, None));

    let err = watcher.watch(&target()).await.unwrap_err();

    // the third failure ends the watch before the Synced observation
    assert_eq!(cluster.fetches(), 5);
    assert_eq!(err.state(), Some(WatchState::Failed));
    match &err {
        WatchError::Failed {
            failures,
            diagnostics,
            ..
        } => {
            assert_eq!(*failures, 3);
            assert_eq!(diagnostics.as_deref(), Some("pull failed,retrying"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("events: pull failed,retrying"));

    let events = cluster.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::Warning);
    assert_eq!(events[0].reason, "FailedSync");
    assert!(events[0]
        .message
        .starts_with("Created helmrequest apps/web error with version: 1.0.0 values: [a=b], err: "));
}

#[tokio::test]
async fn test_failures_below_budget_are_tolerated() {
    let cluster = InMemoryCluster::with_phases(vec![Failed, Failed, Synced]);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, None));

    watcher.watch(&target()).await.unwrap();
    assert_eq!(cluster.fetches(), 3);
    assert_eq!(cluster.events()[0].reason, "Synced");
}

#[tokio::test]
async fn test_zero_tolerance_fails_on_first_failure() {
    let cluster = InMemoryCluster::with_phases(vec![Failed, Synced]);
    cluster.set_diagnostics(Some(Vec::new()));
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(0, None));

    let err = watcher.watch(&target()).await.unwrap_err();
    assert_eq!(cluster.fetches(), 1);
    assert!(matches!(err, WatchError::Failed { failures: 1, .. }));
}

#[tokio::test]
async fn test_zero_timeout_times_out_without_fetching() {
    let cluster = InMemoryCluster::with_phases(vec![Synced]);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, Some(Duration::ZERO)));

    let err = watcher.watch(&target()).await.unwrap_err();

    assert_eq!(cluster.fetches(), 0);
    assert_eq!(err.state(), Some(WatchState::TimedOut));
    let events = cluster.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, "FailedSync");
}

#[tokio::test]
async fn test_times_out_at_deadline() {
    let cluster = InMemoryCluster::with_phases(vec![Pending]);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, Some(Duration::from_secs(5))));

    let err = watcher.watch(&target()).await.unwrap_err();

    assert!(matches!(err, WatchError::TimedOut { timeout, .. } if timeout == Duration::from_secs(5)));
    // polls at 1s..4s, the sleep to 5s hits the deadline
    assert_eq!(cluster.fetches(), 4);
    assert_eq!(clock.elapsed(), Duration::from_secs(5));
}

#[tokio::test]
async fn test_fetch_error_ends_watch() {
    let cluster = InMemoryCluster::new();
    cluster.script(vec![Ok(Pending), Err("connection refused".to_string())]);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, None));

    let err = watcher.watch(&target()).await.unwrap_err();

    assert_eq!(cluster.fetches(), 2);
    assert!(matches!(err, WatchError::Fetch { .. }));
    assert_eq!(err.state(), None);
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(cluster.events().len(), 1);
}

#[tokio::test]
async fn test_diagnostics_error_keeps_failure() {
    let cluster = InMemoryCluster::with_phases(vec![Failed]);
    cluster.set_diagnostics(None);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(1, None));

    let err = watcher.watch(&target()).await.unwrap_err();
    assert!(matches!(
        err,
        WatchError::Failed {
            diagnostics: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_event_error_does_not_change_outcome() {
    let cluster = InMemoryCluster::with_phases(vec![Syncing, Synced]);
    cluster.fail_events();
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, None));

    watcher.watch(&target()).await.unwrap();
    assert_eq!(cluster.events().len(), 1);
}

#[tokio::test]
async fn test_unknown_phase_keeps_waiting() {
    let cluster = InMemoryCluster::with_phases(vec![Unknown, Syncing, Synced]);
    let clock = ManualClock::new();
    let watcher = Watcher::new(&cluster, &cluster, &clock, options(3, None));

    watcher.watch(&target()).await.unwrap();
    assert_eq!(cluster.fetches(), 3);
}
