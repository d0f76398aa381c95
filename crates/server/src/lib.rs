//! Persisted alert state transitions with an append-only history.
//!
//! [`AlertStateStore`](alert_state::AlertStateStore) applies a transition and
//! appends its log entry in one transaction.
//! [`AlertStateLog`](alert_state::AlertStateLog) reads the history back, most
//! recent first. Both only share the database schema.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::alert_state::{AlertStateLog, AlertStateStore};

pub mod alert_state;
pub mod api;
pub mod config;
pub mod entity;
pub mod error;

/// Handlers wired at startup and shared with the HTTP layer.
#[derive(Clone, Debug)]
pub struct AppResources {
    pub store: AlertStateStore,
    pub log: AlertStateLog,
}

impl AppResources {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            store: AlertStateStore::new(db.clone()),
            log: AlertStateLog::new(db),
        }
    }
}
