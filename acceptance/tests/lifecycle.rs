//! Fixture lifecycle integration tests
//!
//! Teardown runs exactly once whatever the scenario body does, and partial
//! setup is handed to the body and cleaned up.

mod common;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use acceptance::{
    ApiResponse, FixtureBuilder, FixtureError, FixtureOrchestrator, FixtureReaper, ScenarioResult, TransportError,
};
use assert_matches::assert_matches;
use futures_util::FutureExt;
use shared::ResourceKind;

use common::fixtures::*;
use common::helpers::*;

fn orchestrator(api: Arc<RecordingApi>) -> FixtureOrchestrator {
    FixtureOrchestrator::new(
        FixtureBuilder::new(api.clone()),
        FixtureReaper::new(api),
        create_short_plan("http://ql:8668"),
    )
}

fn teardown_calls(api: &RecordingApi) -> usize {
    api.count("delete_")
}

#[tokio::test]
async fn test_teardown_runs_after_failing_body() {
    let api = Arc::new(RecordingApi::new());

    let report = orchestrator(api.clone())
        .run(|_handle| async { ScenarioResult::Err("rows never rendered".into()) })
        .await;

    assert_eq!(teardown_calls(&api), 3);
    assert_eq!(report.body_error.as_deref(), Some("rows never rendered"));
    assert_matches!(
        report.into_result(),
        Err(FixtureError::ScenarioFailed { failures }) if failures == vec!["scenario: rows never rendered".to_string()]
    );
}

#[tokio::test]
async fn test_teardown_runs_after_panicking_body() {
    let api = Arc::new(RecordingApi::new());

    let outcome = AssertUnwindSafe(orchestrator(api.clone()).run(|_handle| async {
        if true {
            panic!("assertion blew up");
        }
        ScenarioResult::Ok(())
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err(), "panic should reach the caller");
    assert_eq!(teardown_calls(&api), 3);
}

#[tokio::test]
async fn test_teardown_runs_after_body_times_out() {
    let api = Arc::new(RecordingApi::new());

    let report = orchestrator(api.clone())
        .with_body_timeout(Duration::from_millis(100))
        .run(|_handle| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ScenarioResult::Ok(())
        })
        .await;

    assert_eq!(teardown_calls(&api), 3);
    assert!(report.teardown.is_ok());
    let body_error = report.body_error.as_deref().unwrap_or_default();
    assert!(body_error.contains("timed out"), "{body_error}");
    assert_matches!(report.into_result(), Err(FixtureError::ScenarioFailed { .. }));
}

#[tokio::test]
async fn test_body_within_timeout_is_unaffected() {
    let api = Arc::new(RecordingApi::new());

    let report = orchestrator(api.clone())
        .with_body_timeout(Duration::from_secs(5))
        .run(|_handle| async { ScenarioResult::Ok(()) })
        .await;

    assert!(report.is_success());
    assert_eq!(teardown_calls(&api), 3);
}

#[tokio::test]
async fn test_body_sees_created_resources() {
    let api = Arc::new(RecordingApi::new());

    let report = orchestrator(api.clone())
        .run(|handle| async move {
            assert_eq!(handle.entity_id(), ENTITY_ID);
            assert_eq!(handle.subscription_location(), Some(SUBSCRIPTION_LOCATION));
            assert_eq!(handle.created_sample_count(), 2);
            ScenarioResult::Ok(())
        })
        .await;

    assert!(report.is_success());
    assert_eq!(
        api.calls(),
        vec![
            "create_subscription".to_string(),
            format!("upsert_entity {ENTITY_ID}"),
            format!("upsert_entity {ENTITY_ID}"),
            format!("delete_subscription {SUBSCRIPTION_LOCATION}"),
            format!("delete_time_series {ENTITY_ID}"),
            format!("delete_entity {ENTITY_ID}"),
        ]
    );
}

#[tokio::test]
async fn test_partial_setup_is_handed_over_and_cleaned() {
    let api = Arc::new(RecordingApi::new().with_subscription(Ok(ApiResponse::with_status(500))));

    let report = orchestrator(api.clone())
        .run(|handle| async move {
            assert_eq!(handle.subscription_location(), None);
            assert_eq!(handle.created_sample_count(), 2);
            ScenarioResult::Ok(())
        })
        .await;

    assert_eq!(api.count("upsert_entity"), 2);
    assert_eq!(api.count("delete_subscription"), 0);
    assert_eq!(api.count("delete_time_series"), 1);
    assert_eq!(api.count("delete_entity"), 1);

    let teardown = report.teardown.as_ref().unwrap();
    assert_eq!(
        teardown.outcome(ResourceKind::Subscription),
        Some(&acceptance::DeletionOutcome::SkippedNotCreated)
    );
    assert_eq!(report.setup_errors.len(), 1);
    assert_matches!(report.into_result(), Err(FixtureError::ScenarioFailed { .. }));
}

#[tokio::test]
async fn test_seeding_failure_keeps_partial_count() {
    let api = Arc::new(
        RecordingApi::new().with_upserts(vec![Err(TransportError::new("connection reset"))]),
    );

    let report = orchestrator(api.clone())
        .run(|handle| async move {
            assert_eq!(handle.created_sample_count(), 0);
            ScenarioResult::Ok(())
        })
        .await;

    assert_eq!(api.count("upsert_entity"), 1, "seeding stops at the first failure");
    assert_eq!(teardown_calls(&api), 3);
    assert_matches!(
        report.setup_errors.as_slice(),
        [FixtureError::Seeding { written: 0, .. }]
    );
}
