//! Read side of the alert state history.

use crate::alert_state::command::GetAlertsStateQuery;
use crate::entity::alert_state_log;
use crate::error::AlertStateError;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

/// Query access to `alert_state_log`. Reads run outside any transaction and
/// only observe committed transitions.
#[derive(Clone, Debug)]
pub struct AlertStateLog {
    db: Arc<DatabaseConnection>,
}

impl AlertStateLog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All transitions recorded for `alert_id`, most recent first.
    ///
    /// Returns an empty list for alerts without history, including ids that
    /// do not exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_history(
        &self,
        alert_id: i32,
    ) -> Result<Vec<alert_state_log::Model>, AlertStateError> {
        let entries = alert_state_log::Entity::find()
            .filter(alert_state_log::Column::AlertId.eq(alert_id))
            .order_by_desc(alert_state_log::Column::CreatedAt)
            .order_by_desc(alert_state_log::Column::Id)
            .all(self.db.as_ref())
            .await?;

        tracing::debug!(alert_id, count = entries.len(), "Loaded alert state history");
        Ok(entries)
    }

    pub async fn get_history_query(
        &self,
        query: GetAlertsStateQuery,
    ) -> Result<Vec<alert_state_log::Model>, AlertStateError> {
        self.get_history(query.alert_id).await
    }
}
