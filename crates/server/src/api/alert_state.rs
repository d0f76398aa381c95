//! Alert state API endpoints.
//!
//! - `POST /{id}/state` - Transition an alert to a new state
//! - `GET /{id}/states` - Transition history, most recent first

use crate::AppResources;
use crate::alert_state::{GetAlertsStateQuery, UpdateAlertStateCommand};
use crate::entity::{alert, alert_state_log};
use crate::error::AlertStateError;
use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const ALERT_STATE_TAG: &str = "Alert State API";

/// Request body for a state transition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAlertStateRequest {
    /// Target state, e.g. `ok` or `alerting`
    pub new_state: String,
    /// Free text stored with the log entry
    #[serde(default)]
    pub info: String,
}

/// Transition history of one alert.
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertStateHistoryResponse {
    pub alert_id: i32,
    /// Log entries, most recent first
    pub entries: Vec<alert_state_log::Model>,
}

/// Error body returned by the alert state endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    /// One of `validation`, `not_found`, `storage_failure`
    pub error: String,
    pub message: String,
}

impl From<AlertStateError> for ApiError {
    fn from(err: AlertStateError) -> Self {
        if let AlertStateError::Storage(db_err) = &err {
            tracing::error!(
                name = "api.alert_state.storage_failure",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                message = "Alert state storage failure",
                error = %db_err,
            );
        }
        let status = match &err {
            AlertStateError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AlertStateError::AlertNotFound(_) => StatusCode::NOT_FOUND,
            AlertStateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// A body that is not valid JSON or lacks a string `new_state` is a
/// validation failure like an unknown state name.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "validation".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Creates the alert state router.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(update_alert_state))
        .routes(routes!(get_alert_state_history))
}

/// Transition an alert to a new state.
#[tracing::instrument(skip(resources, payload))]
#[utoipa::path(
    post,
    path = "/{id}/state",
    tag = ALERT_STATE_TAG,
    operation_id = "Update Alert State",
    summary = "Set the state of an alert",
    description = "Moves the alert into `new_state` and records the change in its history.\n\n\
                   Requesting the state the alert is already in changes nothing and returns the alert as is.",
    params(("id" = i32, Path, description = "Alert identifier")),
    request_body = UpdateAlertStateRequest,
    responses(
        (status = 200, description = "Alert after the transition", body = alert::Model),
        (status = 400, description = "Unknown state or malformed body", body = ApiError),
        (status = 404, description = "Alert not found", body = ApiError),
        (status = 500, description = "Storage failure", body = ApiError),
    )
)]
async fn update_alert_state(
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateAlertStateRequest>, JsonRejection>,
) -> Result<Json<alert::Model>, ApiError> {
    let Json(payload) = payload?;
    let cmd = UpdateAlertStateCommand::new(id, payload.new_state, payload.info);
    let alert = resources.store.set_new_state(&cmd).await?;
    Ok(Json(alert))
}

/// List the state history of an alert.
#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/{id}/states",
    tag = ALERT_STATE_TAG,
    operation_id = "Get Alert State History",
    summary = "List state transitions of an alert",
    description = "Returns every recorded transition for the alert, most recent first. \
                   Alerts without history yield an empty list.",
    params(("id" = i32, Path, description = "Alert identifier")),
    responses(
        (status = 200, description = "Transition history", body = AlertStateHistoryResponse),
        (status = 500, description = "Storage failure", body = ApiError),
    )
)]
async fn get_alert_state_history(
    Extension(resources): Extension<AppResources>,
    Path(id): Path<i32>,
) -> Result<Json<AlertStateHistoryResponse>, ApiError> {
    let entries = resources
        .log
        .get_history_query(GetAlertsStateQuery { alert_id: id })
        .await?;
    Ok(Json(AlertStateHistoryResponse {
        alert_id: id,
        entries,
    }))
}
