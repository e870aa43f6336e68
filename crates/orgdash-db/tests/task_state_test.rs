//! Integration tests for task states using in-memory SurrealDB.

use chrono::{TimeDelta, Utc};
use orgdash_core::models::org::CreateOrg;
use orgdash_core::models::task_state::TaskRun;
use orgdash_core::repository::{OrgRepository, TaskStateRepository};
use orgdash_core::OrgError;
use orgdash_db::repository::{SurrealOrgRepository, SurrealTaskStateRepository};
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create an org.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orgdash_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrgRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrg {
            name: "Test Org".into(),
            language: None,
            subdomain: Some("test".into()),
            domain: None,
            timezone: None,
            api_token: None,
            config: None,
        })
        .await
        .unwrap();

    (db, org.id)
}

#[tokio::test]
async fn get_or_create_starts_from_zero_state() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    let state = repo.get_or_create(org_id, "build_boundaries").await.unwrap();

    assert_eq!(state.org_id, org_id);
    assert_eq!(state.task_key, "build_boundaries");
    assert!(!state.has_ever_run());
    assert!(!state.is_failing);
    assert!(!state.is_disabled);

    // Second call returns the same record.
    let again = repo.get_or_create(org_id, "build_boundaries").await.unwrap();
    assert_eq!(again.id, state.id);
}

#[tokio::test]
async fn get_without_create_errors() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    let result = repo.get(org_id, "never_ran").await;
    assert!(matches!(result, Err(OrgError::NotFound { .. })));
}

#[tokio::test]
async fn successful_run_updates_timestamps_and_results() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    let started = Utc::now();
    let ended = started + TimeDelta::seconds(42);

    let state = repo
        .record_run(
            org_id,
            "build_boundaries",
            TaskRun {
                started_on: started,
                ended_on: ended,
                results: Some(json!({"states": 3, "districts": 12})),
                succeeded: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(state.started_on, Some(started));
    assert_eq!(state.ended_on, Some(ended));
    assert_eq!(state.last_successfully_started_on, Some(started));
    assert!(!state.is_failing);
    assert_eq!(
        state.last_results,
        Some(json!({"states": 3, "districts": 12}))
    );
    assert_eq!(state.time_taken(Utc::now()), Some(42.0));
}

#[tokio::test]
async fn failed_run_sets_failing_and_keeps_last_success() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    let first_start = Utc::now();
    repo.record_run(
        org_id,
        "build_boundaries",
        TaskRun {
            started_on: first_start,
            ended_on: first_start + TimeDelta::seconds(10),
            results: None,
            succeeded: true,
        },
    )
    .await
    .unwrap();

    let second_start = first_start + TimeDelta::minutes(60);
    let state = repo
        .record_run(
            org_id,
            "build_boundaries",
            TaskRun {
                started_on: second_start,
                ended_on: second_start + TimeDelta::seconds(5),
                results: Some(json!({"error": "upstream timeout"})),
                succeeded: false,
            },
        )
        .await
        .unwrap();

    assert!(state.is_failing);
    assert_eq!(state.started_on, Some(second_start));
    // The last successful start is preserved across failures.
    assert_eq!(state.last_successfully_started_on, Some(first_start));
}

#[tokio::test]
async fn recovery_clears_failing_flag() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    let start = Utc::now();
    repo.record_run(
        org_id,
        "build_boundaries",
        TaskRun {
            started_on: start,
            ended_on: start + TimeDelta::seconds(1),
            results: None,
            succeeded: false,
        },
    )
    .await
    .unwrap();

    let state = repo
        .record_run(
            org_id,
            "build_boundaries",
            TaskRun {
                started_on: start + TimeDelta::minutes(30),
                ended_on: start + TimeDelta::minutes(31),
                results: None,
                succeeded: true,
            },
        )
        .await
        .unwrap();

    assert!(!state.is_failing);
}

#[tokio::test]
async fn list_failing_skips_inactive_orgs() {
    let (db, org_a) = setup().await;
    let org_repo = SurrealOrgRepository::new(db.clone());
    let org_b = org_repo
        .create(CreateOrg {
            name: "Inactive Org".into(),
            language: None,
            subdomain: Some("inactive".into()),
            domain: None,
            timezone: None,
            api_token: None,
            config: None,
        })
        .await
        .unwrap()
        .id;

    let repo = SurrealTaskStateRepository::new(db);

    let start = Utc::now();
    let failed_run = || TaskRun {
        started_on: start,
        ended_on: start + TimeDelta::seconds(1),
        results: None,
        succeeded: false,
    };

    repo.record_run(org_a, "build_boundaries", failed_run())
        .await
        .unwrap();
    repo.record_run(org_b, "build_boundaries", failed_run())
        .await
        .unwrap();

    org_repo.deactivate(org_b).await.unwrap();

    let failing = repo.list_failing().await.unwrap();
    assert_eq!(failing.len(), 1);
    assert_eq!(failing[0].org_id, org_a);
}

#[tokio::test]
async fn set_disabled_round_trip() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    repo.set_disabled(org_id, "build_boundaries", true)
        .await
        .unwrap();
    assert!(repo.get(org_id, "build_boundaries").await.unwrap().is_disabled);

    repo.set_disabled(org_id, "build_boundaries", false)
        .await
        .unwrap();
    assert!(!repo.get(org_id, "build_boundaries").await.unwrap().is_disabled);
}

#[tokio::test]
async fn task_keys_are_independent() {
    let (db, org_id) = setup().await;
    let repo = SurrealTaskStateRepository::new(db);

    let start = Utc::now();
    repo.record_run(
        org_id,
        "build_boundaries",
        TaskRun {
            started_on: start,
            ended_on: start + TimeDelta::seconds(1),
            results: None,
            succeeded: false,
        },
    )
    .await
    .unwrap();

    let other = repo.get_or_create(org_id, "sync_contacts").await.unwrap();
    assert!(!other.is_failing);
    assert!(!other.has_ever_run());
}
