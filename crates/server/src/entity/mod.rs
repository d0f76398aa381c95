pub mod alert;
pub mod alert_state_log;
