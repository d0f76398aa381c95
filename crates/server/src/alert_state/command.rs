//! Typed requests accepted by the alert state store and log.

use crate::entity::alert::AlertState;
use crate::error::AlertStateError;
use serde::Deserialize;

/// Request to move an alert into `new_state`, recording `info` in the log.
///
/// `new_state` is kept as the raw string received from the caller so that
/// validation happens in one place, before any storage access.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateAlertStateCommand {
    pub alert_id: i32,
    pub new_state: String,
    #[serde(default)]
    pub info: String,
}

impl UpdateAlertStateCommand {
    pub fn new(alert_id: i32, new_state: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            alert_id,
            new_state: new_state.into(),
            info: info.into(),
        }
    }

    pub fn validate(&self) -> Result<AlertState, AlertStateError> {
        AlertState::parse(&self.new_state)
            .ok_or_else(|| AlertStateError::InvalidState(self.new_state.clone()))
    }
}

/// Request for the transition history of one alert.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GetAlertsStateQuery {
    pub alert_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_known_state() {
        let cmd = UpdateAlertStateCommand::new(1, "alerting", "cpu high");
        assert_eq!(cmd.validate().unwrap(), AlertState::Alerting);
    }

    #[test]
    fn validate_rejects_unknown_state() {
        let cmd = UpdateAlertStateCommand::new(1, "bogus-state", "x");
        match cmd.validate() {
            Err(AlertStateError::InvalidState(raw)) => assert_eq!(raw, "bogus-state"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }
}
