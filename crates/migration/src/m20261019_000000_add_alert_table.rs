use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(pk_auto(Alert::Id))
                    .col(integer(Alert::OrgId).not_null())
                    .col(string(Alert::Name).not_null())
                    .col(string_len(Alert::State, 16).not_null())
                    .col(
                        timestamp_with_time_zone(Alert::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Alert::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alert_org_id")
                    .table(Alert::Table)
                    .col(Alert::OrgId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_alert_org_id")
                    .table(Alert::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Alert {
    Table,
    Id,
    OrgId,
    Name,
    State,
    CreatedAt,
    UpdatedAt,
}
