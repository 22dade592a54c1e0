use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Add the case tables: the status lookup, the cases themselves and the
/// per-analyst questionnaire responses.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseStatus::Table)
                    .if_not_exists()
                    .col(pk_auto(CaseStatus::StatusId))
                    .col(string(CaseStatus::StatusName).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(pk_auto(Cases::CaseId))
                    .col(string(Cases::CaseNumber).not_null().unique_key())
                    .col(string(Cases::Title).not_null())
                    .col(text_null(Cases::Description))
                    .col(integer(Cases::Priority).not_null().default(3))
                    .col(integer(Cases::StatusId).not_null())
                    .col(integer_null(Cases::AssignedTo))
                    .col(integer(Cases::CreatedBy).not_null())
                    .col(integer_null(Cases::AlertId))
                    .col(boolean(Cases::IsClosed).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Cases::ClosedAt))
                    .col(
                        timestamp_with_time_zone(Cases::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Cases::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_alert_id")
                    .table(Cases::Table)
                    .col(Cases::AlertId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_assigned_to")
                    .table(Cases::Table)
                    .col(Cases::AssignedTo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CaseUserResponses::Table)
                    .if_not_exists()
                    .col(pk_auto(CaseUserResponses::ResponseId))
                    .col(integer(CaseUserResponses::CaseId).not_null())
                    .col(integer(CaseUserResponses::UserId).not_null())
                    .col(json_binary(CaseUserResponses::Answers).not_null())
                    .col(
                        integer(CaseUserResponses::TotalPoints)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        timestamp_with_time_zone(CaseUserResponses::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(CaseUserResponses::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // The answers upsert conflicts on (case_id, user_id), so this one must
        // be unique.
        manager
            .create_index(
                Index::create()
                    .name("idx_case_user_responses_case_user")
                    .table(CaseUserResponses::Table)
                    .col(CaseUserResponses::CaseId)
                    .col(CaseUserResponses::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_case_user_responses_case_user")
                    .table(CaseUserResponses::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CaseUserResponses::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_cases_assigned_to")
                    .table(Cases::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_cases_alert_id")
                    .table(Cases::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Cases::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CaseStatus::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum CaseStatus {
    Table,
    StatusId,
    StatusName,
}

#[derive(Iden)]
pub enum Cases {
    Table,
    CaseId,
    CaseNumber,
    Title,
    Description,
    Priority,
    StatusId,
    AssignedTo,
    CreatedBy,
    AlertId,
    IsClosed,
    ClosedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum CaseUserResponses {
    Table,
    ResponseId,
    CaseId,
    UserId,
    Answers,
    TotalPoints,
    CreatedAt,
    UpdatedAt,
}
