use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Append-only history of alert state transitions.
///
/// `alert_id` carries no foreign key: history outlives the alert row.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertStateLog::Table)
                    .if_not_exists()
                    .col(pk_auto(AlertStateLog::Id))
                    .col(integer(AlertStateLog::AlertId).not_null())
                    .col(integer(AlertStateLog::OrgId).not_null())
                    .col(string_len(AlertStateLog::NewState, 16).not_null())
                    .col(text(AlertStateLog::Info).not_null().default(""))
                    .col(
                        timestamp_with_time_zone(AlertStateLog::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alert_state_log_alert_id_created_at")
                    .table(AlertStateLog::Table)
                    .col(AlertStateLog::AlertId)
                    .col(AlertStateLog::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_alert_state_log_alert_id_created_at")
                    .table(AlertStateLog::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AlertStateLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AlertStateLog {
    Table,
    Id,
    AlertId,
    OrgId,
    NewState,
    Info,
    CreatedAt,
}
