//! Transactional state transitions for alerts.

use crate::alert_state::command::UpdateAlertStateCommand;
use crate::entity::alert::{self, AlertState};
use crate::entity::alert_state_log;
use crate::error::AlertStateError;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Applies state transitions to the `alert` table and appends the matching
/// `alert_state_log` row in the same transaction.
#[derive(Clone, Debug)]
pub struct AlertStateStore {
    db: Arc<DatabaseConnection>,
}

impl AlertStateStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Validate and apply an [`UpdateAlertStateCommand`].
    ///
    /// An unknown state name fails with [`AlertStateError::InvalidState`]
    /// before a transaction is opened.
    #[tracing::instrument(skip(self, cmd), fields(alert_id = cmd.alert_id, new_state = %cmd.new_state))]
    pub async fn set_new_state(
        &self,
        cmd: &UpdateAlertStateCommand,
    ) -> Result<alert::Model, AlertStateError> {
        let new_state = cmd.validate()?;
        self.transition(cmd.alert_id, new_state, &cmd.info).await
    }

    /// Move alert `alert_id` into `new_state`.
    ///
    /// If the alert is already in `new_state` nothing is written and the
    /// current alert is returned. Otherwise the alert row is updated and one
    /// log entry is appended; both are committed together or not at all.
    #[tracing::instrument(skip(self, new_state, info), fields(new_state = %new_state))]
    pub async fn transition(
        &self,
        alert_id: i32,
        new_state: AlertState,
        info: &str,
    ) -> Result<alert::Model, AlertStateError> {
        // Any early return drops `txn` uncommitted, which rolls it back.
        let txn = self.db.begin().await?;

        let Some(current) = alert::Entity::find_by_id(alert_id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Err(AlertStateError::AlertNotFound(alert_id));
        };

        if current.state == new_state {
            txn.commit().await?;
            tracing::debug!(
                name = "alert_state.transition.unchanged",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                message = "Alert already in requested state",
                alert_id,
                state = %new_state,
            );
            return Ok(current);
        }

        let created_at = next_log_timestamp(&txn, alert_id, OffsetDateTime::now_utc()).await?;
        let previous_state = current.state;
        let org_id = current.org_id;

        let mut active: alert::ActiveModel = current.into();
        active.state = Set(new_state);
        active.updated_at = Set(created_at);
        let updated = active.update(&txn).await?;

        let entry = alert_state_log::ActiveModel {
            alert_id: Set(alert_id),
            org_id: Set(org_id),
            new_state: Set(new_state),
            info: Set(info.to_string()),
            created_at: Set(created_at),
            ..Default::default()
        };
        entry.insert(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            name = "alert_state.transition.applied",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            message = "Alert state changed",
            alert_id,
            org_id,
            from = %previous_state,
            to = %new_state,
        );

        Ok(updated)
    }
}

/// Timestamp for the next log entry of `alert_id`.
///
/// Postgres keeps microseconds, so `now` is truncated to match. If the
/// newest existing entry is not older than `now` the result is placed one
/// microsecond after it, keeping per-alert timestamps strictly increasing.
async fn next_log_timestamp<C: ConnectionTrait>(
    conn: &C,
    alert_id: i32,
    now: OffsetDateTime,
) -> Result<OffsetDateTime, DbErr> {
    let now = truncate_to_micros(now);
    let latest = alert_state_log::Entity::find()
        .filter(alert_state_log::Column::AlertId.eq(alert_id))
        .order_by_desc(alert_state_log::Column::CreatedAt)
        .one(conn)
        .await?;

    Ok(match latest {
        Some(entry) if entry.created_at >= now => entry.created_at + Duration::microseconds(1),
        _ => now,
    })
}

fn truncate_to_micros(ts: OffsetDateTime) -> OffsetDateTime {
    ts - Duration::nanoseconds(i64::from(ts.nanosecond() % 1_000))
}
