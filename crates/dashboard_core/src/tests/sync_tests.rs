use super::*;
use crate::test_support::{metrics, person, FakeApi};
use shared::protocol::Resource;

fn seated() -> Vec<Person> {
    vec![person("AP", 1), person("BI", 1), person("VS", 2)]
}

#[test]
fn initial_state_is_loading_and_empty() {
    let controller = SyncController::new(Arc::new(FakeApi::new(
        metrics(1.0, 1.0),
        Vec::new(),
        false,
    )));
    let state = controller.state();
    assert!(state.is_loading);
    assert!(!state.has_data);
    assert!(state.error.is_none());
    assert!(state.data.people.is_empty());
}

#[tokio::test]
async fn successful_cycle_commits_all_three_resources() {
    let api = Arc::new(FakeApi::new(metrics(3.0, 1.0), seated(), true));
    let controller = SyncController::new(api);

    let data = controller.refresh().await.expect("refresh");
    assert_eq!(data.people.len(), 3);

    let state = controller.state();
    assert!(!state.is_loading);
    assert!(state.has_data);
    assert!(state.error.is_none());
    assert!(state.last_synced_at.is_some());
    assert_eq!(state.data.max_table_index(), 2);
    assert!(state.data.session_started);
    assert_eq!(state.data.metrics.round_time_minutes, 3.0);
}

#[tokio::test]
async fn failing_ready_endpoint_commits_nothing() {
    let api = Arc::new(FakeApi::new(metrics(3.0, 1.0), seated(), true));
    api.fail(Some(Resource::Ready));
    let controller = SyncController::new(api);

    let err = controller.refresh().await.expect_err("must fail");
    assert!(matches!(err, SyncError::Status { status: 503, .. }));
    assert_eq!(err.resource(), Resource::Ready);

    let state = controller.state();
    assert!(!state.is_loading);
    assert!(!state.has_data);
    assert!(state.data.people.is_empty());
    assert_eq!(state.data.metrics, Metrics::default());
    assert_eq!(state.error.as_deref(), Some("/ready responded with HTTP 503"));
}

#[tokio::test]
async fn later_failure_keeps_last_good_data() {
    let api = Arc::new(FakeApi::new(metrics(3.0, 1.0), seated(), true));
    let controller = SyncController::new(api.clone());
    controller.refresh().await.expect("first refresh");
    let committed = controller.state().data;

    api.set_people(vec![person("ZZ", 9)]);
    api.fail(Some(Resource::Metrics));
    controller.refresh().await.expect_err("second refresh fails");

    let state = controller.state();
    assert!(!state.is_loading);
    assert!(state.has_data);
    assert_eq!(state.data, committed);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let api = Arc::new(FakeApi::new(metrics(3.0, 1.0), seated(), false));
    api.fail(Some(Resource::Users));
    let controller = SyncController::new(api.clone());
    controller.refresh().await.expect_err("first refresh fails");
    assert!(controller.state().error.is_some());

    api.fail(None);
    controller.refresh().await.expect("retry");
    let state = controller.state();
    assert!(state.error.is_none());
    assert!(state.has_data);
}

#[tokio::test]
async fn superseded_cycle_result_is_discarded() {
    let api = Arc::new(FakeApi::new(metrics(3.0, 1.0), seated(), true));
    let gate = api.hold_next_session();
    let controller = Arc::new(SyncController::new(api.clone()));

    let slow = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    api.gate_entered.notified().await;

    api.set_people(vec![person("NEW", 5)]);
    controller.refresh().await.expect("fresh refresh");

    gate.notify_one();
    let stale = slow.await.expect("join").expect("stale refresh still resolves");
    assert_eq!(stale.people.len(), 3);

    let state = controller.state();
    assert_eq!(state.data.people, vec![person("NEW", 5)]);
    assert_eq!(state.data.max_table_index(), 5);
}

#[tokio::test]
async fn subscribers_observe_commits() {
    let api = Arc::new(FakeApi::new(metrics(1.0, 1.0), seated(), true));
    let controller = SyncController::new(api);
    let mut rx = controller.subscribe();

    controller.refresh().await.expect("refresh");
    rx.changed().await.expect("changed");
    assert!(rx.borrow().has_data);
}
