//! Tests for the alert state store and history log against an in-memory
//! SQLite database migrated with the real schema.

use alert_state_history::alert_state::{
    AlertStateLog, AlertStateStore, GetAlertsStateQuery, UpdateAlertStateCommand,
};
use alert_state_history::entity::alert::{self, AlertState};
use alert_state_history::entity::alert_state_log;
use alert_state_history::error::AlertStateError;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, Statement,
};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Create an in-memory SQLite database with the migrated schema.
async fn setup_test_db() -> Arc<DatabaseConnection> {
    // One connection keeps concurrent tests serialized on the pool instead of
    // tripping SQLite's shared-cache table locks.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to apply migrations");
    Arc::new(db)
}

/// Create a test alert in the database.
async fn create_test_alert(
    db: &DatabaseConnection,
    org_id: i32,
    state: AlertState,
) -> alert::Model {
    let now = OffsetDateTime::now_utc();
    let alert = alert::ActiveModel {
        org_id: Set(org_id),
        name: Set("cpu usage".to_string()),
        state: Set(state),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    alert.insert(db).await.expect("Failed to create test alert")
}

async fn load_alert(db: &DatabaseConnection, id: i32) -> alert::Model {
    alert::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("Failed to load alert")
        .expect("Alert missing")
}

async fn total_log_entries(db: &DatabaseConnection) -> u64 {
    alert_state_log::Entity::find()
        .count(db)
        .await
        .expect("Failed to count log entries")
}

fn truncate_to_micros(ts: OffsetDateTime) -> OffsetDateTime {
    ts - Duration::nanoseconds(i64::from(ts.nanosecond() % 1_000))
}

// =============================================================================
// Transitions
// =============================================================================

#[tokio::test]
async fn test_transition_updates_alert_and_appends_log() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 7, AlertState::Ok).await;

    let started = OffsetDateTime::now_utc();
    let updated = store
        .set_new_state(&UpdateAlertStateCommand::new(created.id, "alerting", "cpu high"))
        .await
        .expect("transition should succeed");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.state, AlertState::Alerting);
    assert_eq!(load_alert(&db, created.id).await.state, AlertState::Alerting);

    let history = log.get_history(created.id).await.expect("history");
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.alert_id, created.id);
    assert_eq!(entry.new_state, AlertState::Alerting);
    assert_eq!(entry.info, "cpu high");
    assert!(entry.created_at >= truncate_to_micros(started));
    assert_eq!(updated.updated_at, entry.created_at);
}

#[tokio::test]
async fn test_log_entry_carries_alert_org_id() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 42, AlertState::Ok).await;

    store
        .transition(created.id, AlertState::Pending, "")
        .await
        .expect("transition should succeed");

    let history = log.get_history(created.id).await.expect("history");
    assert_eq!(history[0].org_id, 42);
    assert_ne!(history[0].org_id, created.id);
}

#[tokio::test]
async fn test_same_state_is_a_no_op() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    store
        .set_new_state(&UpdateAlertStateCommand::new(created.id, "alerting", "cpu high"))
        .await
        .expect("first transition");
    let before = load_alert(&db, created.id).await;

    let returned = store
        .set_new_state(&UpdateAlertStateCommand::new(created.id, "alerting", "duplicate"))
        .await
        .expect("duplicate transition is not an error");

    // The unchanged alert comes back, not an empty value.
    assert_eq!(returned, before);
    assert_eq!(load_alert(&db, created.id).await, before);

    let history = log.get_history(created.id).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].info, "cpu high");
}

#[tokio::test]
async fn test_invalid_state_is_rejected_without_side_effects() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    store
        .set_new_state(&UpdateAlertStateCommand::new(created.id, "alerting", "cpu high"))
        .await
        .expect("first transition");
    let before = load_alert(&db, created.id).await;

    let result = store
        .set_new_state(&UpdateAlertStateCommand::new(created.id, "bogus-state", "x"))
        .await;

    match result {
        Err(AlertStateError::InvalidState(raw)) => assert_eq!(raw, "bogus-state"),
        other => panic!("expected InvalidState, got {other:?}"),
    }
    assert_eq!(load_alert(&db, created.id).await, before);
    assert_eq!(log.get_history(created.id).await.expect("history").len(), 1);
}

#[tokio::test]
async fn test_unknown_alert_is_not_found() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());

    let result = store.transition(999, AlertState::Alerting, "x").await;

    assert!(matches!(result, Err(AlertStateError::AlertNotFound(999))));
    assert_eq!(total_log_entries(&db).await, 0);
    assert_eq!(alert::Entity::find().count(db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_log_insert_rolls_back_alert_update() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TRIGGER reject_state_log BEFORE INSERT ON alert_state_log
           BEGIN SELECT RAISE(ABORT, 'log insert rejected'); END;"#,
    ))
    .await
    .expect("Failed to create trigger");

    let result = store.transition(created.id, AlertState::Alerting, "x").await;

    match result {
        Err(err @ AlertStateError::Storage(_)) => assert!(err.is_retryable()),
        other => panic!("expected Storage error, got {other:?}"),
    }
    let after = load_alert(&db, created.id).await;
    assert_eq!(after.state, AlertState::Ok);
    assert_eq!(after.updated_at, created.updated_at);
    assert_eq!(total_log_entries(&db).await, 0);
}

#[tokio::test]
async fn test_concurrent_transitions_keep_alert_and_log_consistent() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        let state = if i % 2 == 0 {
            AlertState::Alerting
        } else {
            AlertState::Ok
        };
        handles.push(tokio::spawn(async move {
            store
                .transition(created.id, state, &format!("run {i}"))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("transition failed");
    }

    let alert = load_alert(&db, created.id).await;
    let history = log.get_history(created.id).await.expect("history");
    assert!(!history.is_empty());
    assert_eq!(alert.state, history[0].new_state);
    for pair in history.windows(2) {
        assert!(pair[0].created_at > pair[1].created_at);
        assert_ne!(pair[0].new_state, pair[1].new_state);
    }
}

#[tokio::test]
async fn test_log_timestamp_moves_past_newer_existing_entry() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    // An entry stamped ahead of the current clock, e.g. written by a host with clock skew.
    let ahead = truncate_to_micros(OffsetDateTime::now_utc() + Duration::hours(1));
    let seeded = alert_state_log::ActiveModel {
        alert_id: Set(created.id),
        org_id: Set(1),
        new_state: Set(AlertState::Pending),
        info: Set("seed".to_string()),
        created_at: Set(ahead),
        ..Default::default()
    }
    .insert(db.as_ref())
    .await
    .expect("Failed to seed log entry");

    let updated = store
        .transition(created.id, AlertState::Alerting, "x")
        .await
        .expect("transition should succeed");

    let history = log.get_history(created.id).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].info, "x");
    assert_eq!(history[0].created_at, seeded.created_at + Duration::microseconds(1));
    assert_eq!(history[1].id, seeded.id);
    assert_eq!(updated.updated_at, history[0].created_at);
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_history_is_most_recent_first() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    for (state, info) in [
        (AlertState::Pending, "threshold crossed"),
        (AlertState::Alerting, "cpu high"),
        (AlertState::Ok, "recovered"),
        (AlertState::NoData, "agent offline"),
    ] {
        store
            .transition(created.id, state, info)
            .await
            .expect("transition");
    }

    let history = log
        .get_history_query(GetAlertsStateQuery {
            alert_id: created.id,
        })
        .await
        .expect("history");

    let states: Vec<_> = history.iter().map(|e| e.new_state).collect();
    assert_eq!(
        states,
        vec![
            AlertState::NoData,
            AlertState::Ok,
            AlertState::Alerting,
            AlertState::Pending
        ]
    );
    for pair in history.windows(2) {
        assert!(pair[0].created_at > pair[1].created_at);
        assert!(pair[0].id > pair[1].id);
    }
    assert_eq!(load_alert(&db, created.id).await.state, history[0].new_state);
}

#[tokio::test]
async fn test_history_empty_without_transitions() {
    let db = setup_test_db().await;
    let log = AlertStateLog::new(db.clone());
    let created = create_test_alert(&db, 1, AlertState::Ok).await;

    assert!(log.get_history(created.id).await.expect("history").is_empty());
    assert!(log.get_history(12345).await.expect("history").is_empty());
}

#[tokio::test]
async fn test_history_is_scoped_to_alert() {
    let db = setup_test_db().await;
    let store = AlertStateStore::new(db.clone());
    let log = AlertStateLog::new(db.clone());
    let first = create_test_alert(&db, 1, AlertState::Ok).await;
    let second = create_test_alert(&db, 1, AlertState::Ok).await;

    store
        .transition(first.id, AlertState::Alerting, "first")
        .await
        .expect("transition");
    store
        .transition(second.id, AlertState::Paused, "second")
        .await
        .expect("transition");
    store
        .transition(second.id, AlertState::Ok, "second again")
        .await
        .expect("transition");

    let first_history = log.get_history(first.id).await.expect("history");
    let second_history = log.get_history(second.id).await.expect("history");
    assert_eq!(first_history.len(), 1);
    assert_eq!(second_history.len(), 2);
    assert!(first_history.iter().all(|e| e.alert_id == first.id));
    assert!(second_history.iter().all(|e| e.alert_id == second.id));
}
