pub use sea_orm_migration::prelude::*;

mod m20261019_000000_add_alert_table;
mod m20261019_000001_add_alert_state_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000000_add_alert_table::Migration),
            Box::new(m20261019_000001_add_alert_state_log::Migration),
        ]
    }
}
