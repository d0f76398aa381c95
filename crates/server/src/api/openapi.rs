//! OpenAPI/Utoipa configuration.

use crate::api::{alert_state::ALERT_STATE_TAG, health::MISC_TAG};
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alert State History API",
        version = "1.0.0",
        description = "Record alert state transitions and read their history."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = ALERT_STATE_TAG, description = "Alert state transition endpoints")
    )
)]
pub struct ApiDoc;
