use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Add the log_management table backing the raw log search.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LogManagement::Table)
                    .if_not_exists()
                    .col(pk_auto(LogManagement::LogId))
                    .col(big_integer(LogManagement::EventId).not_null())
                    .col(string_null(LogManagement::LogSource))
                    .col(string_null(LogManagement::SourceIp))
                    .col(string_null(LogManagement::DestinationIp))
                    .col(integer_null(LogManagement::SourcePort))
                    .col(integer_null(LogManagement::DestinationPort))
                    .col(timestamp_with_time_zone(LogManagement::LogTime).not_null())
                    .col(text_null(LogManagement::RawLog))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_log_management_log_time")
                    .table(LogManagement::Table)
                    .col(LogManagement::LogTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_log_management_event_id")
                    .table(LogManagement::Table)
                    .col(LogManagement::EventId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_log_management_event_id")
                    .table(LogManagement::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_log_management_log_time")
                    .table(LogManagement::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(LogManagement::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum LogManagement {
    Table,
    LogId,
    EventId,
    LogSource,
    SourceIp,
    DestinationIp,
    SourcePort,
    DestinationPort,
    LogTime,
    RawLog,
}
