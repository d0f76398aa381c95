use sea_orm::DbErr;
use thiserror::Error;

/// Failures surfaced by the alert state store and log.
#[derive(Debug, Error)]
pub enum AlertStateError {
    /// The requested state is not a member of [`AlertState`](crate::entity::alert::AlertState).
    #[error("invalid alert state: {0:?}")]
    InvalidState(String),
    #[error("alert {0} not found")]
    AlertNotFound(i32),
    #[error("storage failure: {0}")]
    Storage(#[from] DbErr),
}

impl AlertStateError {
    /// Short machine-readable kind, used in API error bodies and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertStateError::InvalidState(_) => "validation",
            AlertStateError::AlertNotFound(_) => "not_found",
            AlertStateError::Storage(_) => "storage_failure",
        }
    }

    /// Only storage failures can succeed on a later attempt; the caller owns retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AlertStateError::Storage(_))
    }
}
