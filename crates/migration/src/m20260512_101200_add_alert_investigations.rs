use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Add the alert_investigations table recording which analyst owns which
/// alert. Rows are deactivated rather than deleted when an alert is released,
/// so the table doubles as a claim history.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertInvestigations::Table)
                    .if_not_exists()
                    .col(pk_auto(AlertInvestigations::InvestigationId))
                    .col(integer(AlertInvestigations::AlertId).not_null())
                    .col(integer(AlertInvestigations::UserId).not_null())
                    .col(
                        boolean(AlertInvestigations::IsActive)
                            .not_null()
                            .default(true),
                    )
                    .col(
                        timestamp_with_time_zone(AlertInvestigations::StartedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(text_null(AlertInvestigations::Notes))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alert_investigations_alert_active")
                    .table(AlertInvestigations::Table)
                    .col(AlertInvestigations::AlertId)
                    .col(AlertInvestigations::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alert_investigations_user_active")
                    .table(AlertInvestigations::Table)
                    .col(AlertInvestigations::UserId)
                    .col(AlertInvestigations::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_alert_investigations_user_active")
                    .table(AlertInvestigations::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_alert_investigations_alert_active")
                    .table(AlertInvestigations::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table(AlertInvestigations::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum AlertInvestigations {
    Table,
    InvestigationId,
    AlertId,
    UserId,
    IsActive,
    StartedAt,
    Notes,
}
