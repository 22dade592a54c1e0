use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Add the core alert tables: severity and type lookups, the alerts
/// themselves and the per-alert detail key/value rows.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SeverityLevels::Table)
                    .if_not_exists()
                    .col(pk_auto(SeverityLevels::SeverityId))
                    .col(string(SeverityLevels::SeverityName).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlertTypes::Table)
                    .if_not_exists()
                    .col(pk_auto(AlertTypes::TypeId))
                    .col(string(AlertTypes::TypeName).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(pk_auto(Alerts::AlertId))
                    .col(big_integer(Alerts::EventId).not_null())
                    .col(timestamp_with_time_zone(Alerts::EventTime).not_null())
                    .col(string(Alerts::RuleName).not_null())
                    .col(integer(Alerts::SeverityId).not_null())
                    .col(integer_null(Alerts::AlertTypeId))
                    .col(string_null(Alerts::SourceIp))
                    .col(string_null(Alerts::DestinationIp))
                    .col(string_null(Alerts::Protocol))
                    .col(text_null(Alerts::RawMessage))
                    .col(string(Alerts::Status).not_null().default("Open"))
                    .col(boolean(Alerts::IsClosed).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Alerts::ClosedAt))
                    .col(integer_null(Alerts::ClosedBy))
                    .col(text_null(Alerts::ClosureReason))
                    .col(string_null(Alerts::ClosureResult))
                    .col(boolean_null(Alerts::UserAssessmentCorrect))
                    .col(string_null(Alerts::ExpectedResult))
                    .col(string_null(Alerts::MaliciousEntity))
                    .col(text_null(Alerts::Feedback))
                    .col(boolean(Alerts::AnswersProvided).not_null().default(false))
                    .col(boolean(Alerts::AnswersCorrect).not_null().default(false))
                    .col(json_binary_null(Alerts::AnswersSummary))
                    .col(
                        timestamp_with_time_zone(Alerts::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Alerts::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_event_id")
                    .table(Alerts::Table)
                    .col(Alerts::EventId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_is_closed")
                    .table(Alerts::Table)
                    .col(Alerts::IsClosed)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlertDetails::Table)
                    .if_not_exists()
                    .col(pk_auto(AlertDetails::DetailId))
                    .col(integer(AlertDetails::AlertId).not_null())
                    .col(string(AlertDetails::FieldName).not_null())
                    .col(text_null(AlertDetails::FieldValue))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alert_details_alert_id")
                    .table(AlertDetails::Table)
                    .col(AlertDetails::AlertId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_alert_details_alert_id")
                    .table(AlertDetails::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AlertDetails::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_alerts_is_closed")
                    .table(Alerts::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_alerts_event_id")
                    .table(Alerts::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AlertTypes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SeverityLevels::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SeverityLevels {
    Table,
    SeverityId,
    SeverityName,
}

#[derive(Iden)]
pub enum AlertTypes {
    Table,
    TypeId,
    TypeName,
}

#[derive(Iden)]
pub enum Alerts {
    Table,
    AlertId,
    EventId,
    EventTime,
    RuleName,
    SeverityId,
    AlertTypeId,
    SourceIp,
    DestinationIp,
    Protocol,
    RawMessage,
    Status,
    IsClosed,
    ClosedAt,
    ClosedBy,
    ClosureReason,
    ClosureResult,
    UserAssessmentCorrect,
    ExpectedResult,
    MaliciousEntity,
    Feedback,
    AnswersProvided,
    AnswersCorrect,
    AnswersSummary,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum AlertDetails {
    Table,
    DetailId,
    AlertId,
    FieldName,
    FieldValue,
}
