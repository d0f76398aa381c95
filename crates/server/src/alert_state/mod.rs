//! Alert state transitions and their history.
//!
//! ## Submodules
//!
//! - `command` - Typed requests for the store and the log
//! - `store` - Transactional update of an alert plus log append
//! - `history` - Reverse chronological history reads

pub mod command;
pub mod history;
pub mod store;

pub use command::{GetAlertsStateQuery, UpdateAlertStateCommand};
pub use history::AlertStateLog;
pub use store::AlertStateStore;
