use sea_orm_migration::prelude::*;

use crate::m20260505_131500_add_alert_tables::{AlertTypes, SeverityLevels};
use crate::m20260519_114500_add_case_tables::CaseStatus;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SEVERITIES: [&str; 4] = ["Critical", "High", "Medium", "Low"];
const CASE_STATUSES: [&str; 3] = ["Open", "In Progress", "Closed"];
const ALERT_TYPES: [&str; 6] = [
    "Malware",
    "Phishing",
    "Brute Force",
    "Data Exfiltration",
    "Policy Violation",
    "Port Scan",
];

/// Seed the lookup tables the application resolves by name at runtime.
/// The lifecycle refuses to start without an "Open" case status.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut severities = Query::insert()
            .into_table(SeverityLevels::Table)
            .columns([SeverityLevels::SeverityName])
            .to_owned();
        for name in SEVERITIES {
            severities.values_panic([name.into()]);
        }
        manager.exec_stmt(severities).await?;

        let mut statuses = Query::insert()
            .into_table(CaseStatus::Table)
            .columns([CaseStatus::StatusName])
            .to_owned();
        for name in CASE_STATUSES {
            statuses.values_panic([name.into()]);
        }
        manager.exec_stmt(statuses).await?;

        let mut types = Query::insert()
            .into_table(AlertTypes::Table)
            .columns([AlertTypes::TypeName])
            .to_owned();
        for name in ALERT_TYPES {
            types.values_panic([name.into()]);
        }
        manager.exec_stmt(types).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(AlertTypes::Table)
                    .and_where(Expr::col(AlertTypes::TypeName).is_in(ALERT_TYPES))
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(CaseStatus::Table)
                    .and_where(Expr::col(CaseStatus::StatusName).is_in(CASE_STATUSES))
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(SeverityLevels::Table)
                    .and_where(Expr::col(SeverityLevels::SeverityName).is_in(SEVERITIES))
                    .to_owned(),
            )
            .await
    }
}
