use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Lifecycle state of an alert as persisted in the `alert` and
/// `alert_state_log` tables.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    #[sea_orm(string_value = "ok")]
    Ok,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "alerting")]
    Alerting,
    #[sea_orm(string_value = "no_data")]
    NoData,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "unknown")]
    Unknown,
}

impl AlertState {
    pub const ALL: [AlertState; 6] = [
        AlertState::Ok,
        AlertState::Pending,
        AlertState::Alerting,
        AlertState::NoData,
        AlertState::Paused,
        AlertState::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertState::Ok => "ok",
            AlertState::Pending => "pending",
            AlertState::Alerting => "alerting",
            AlertState::NoData => "no_data",
            AlertState::Paused => "paused",
            AlertState::Unknown => "unknown",
        }
    }

    /// Parse a raw state name. Matching is exact; `"OK"` is not a valid state.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == raw)
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "alert")]
#[schema(as = Alert)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub org_id: i32,
    pub name: String,
    pub state: AlertState,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
