//! Read-side projections: the main alert queue, the analyst's personal
//! queue, the closed-alert scoreboard, the case queue and the single-alert
//! drill-down.

use crate::entity::{
    alert, alert_detail, alert_investigation, alert_type, case, case_status, severity_level, user,
};
use crate::error::ApiError;
use sea_orm::sea_query::{Alias, Expr, Func, IntoCondition, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

/// Optional filters shared by the main and personal alert queues.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AlertFilters {
    /// Severity name, matched case-insensitively.
    pub severity: Option<String>,
    /// Alert status, matched case-insensitively.
    pub status: Option<String>,
    /// Free-text match against the event id and raw message.
    pub filter: Option<String>,
}

/// Filters accepted by the case queue.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CaseFilters {
    /// Restrict to a single assignee.
    pub assigned_to: Option<i32>,
    /// Case status label, matched case-insensitively. The special value
    /// `closed` switches the endpoint to the closed-alert scoreboard.
    pub status: Option<String>,
}

/// Main queue row: the full alert plus resolved severity and type names.
#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct QueueAlert {
    #[sea_orm(nested)]
    #[serde(flatten)]
    pub alert: alert::Model,
    pub severity_name: String,
    pub type_name: Option<String>,
}

/// Personal queue row: the alert plus metadata of the analyst's own claim.
#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct InvestigationAlert {
    #[sea_orm(nested)]
    #[serde(flatten)]
    pub alert: alert::Model,
    pub severity_name: String,
    pub investigation_id: i32,
    pub investigation_started: OffsetDateTime,
    pub investigation_notes: Option<String>,
}

/// Scoreboard row for an alert the analyst has closed.
#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct ClosedCaseRow {
    pub alert_id: i32,
    pub event_id: i64,
    #[serde(rename = "eventTime")]
    pub event_time: OffsetDateTime,
    pub rule_name: String,
    pub severity: Option<String>,
    pub alert_type: Option<String>,
    pub expected_result: Option<String>,
    pub user_assessment_correct: Option<bool>,
    pub user_assessment: Option<String>,
    pub points: i32,
    pub answers_provided: bool,
    pub answers_correct: bool,
    pub answers_summary: Option<serde_json::Value>,
    pub closed_at: Option<OffsetDateTime>,
}

/// Case queue row: the case plus assignee name and status label.
#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct CaseRow {
    #[sea_orm(nested)]
    #[serde(flatten)]
    pub case: case::Model,
    pub assigned_to_name: String,
    pub case_status: String,
}

/// Single-alert drill-down keyed by SIEM event id.
#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct AlertDetail {
    pub event_id: i64,
    pub event_time: OffsetDateTime,
    pub rule_name: String,
    pub level: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub protocol: Option<String>,
    pub firewall_action: Option<String>,
    pub trigger_reason: Option<String>,
    pub user_assessment: Option<String>,
    pub expected_result: Option<String>,
    pub user_assessment_correct: Option<bool>,
    pub points: i32,
}

fn apply_alert_filters(
    mut select: Select<alert::Entity>,
    filters: &AlertFilters,
) -> Select<alert::Entity> {
    if let Some(severity) = filters.severity.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((
                severity_level::Entity,
                severity_level::Column::SeverityName,
            ))))
            .eq(severity.to_lowercase()),
        );
    }
    if let Some(status) = filters.status.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((
                alert::Entity,
                alert::Column::Status,
            ))))
            .eq(status.to_lowercase()),
        );
    }
    if let Some(term) = filters.filter.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", term.to_lowercase());
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(
                        Expr::col((alert::Entity, alert::Column::EventId))
                            .cast_as(Alias::new("text")),
                    ))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        alert::Entity,
                        alert::Column::RawMessage,
                    ))))
                    .like(pattern),
                ),
        );
    }
    select
}

/// +5 when the graded verdict matched, -2 when it did not, 0 when ungraded.
fn points_expr() -> SimpleExpr {
    Expr::case(
        Expr::col((alert::Entity, alert::Column::UserAssessmentCorrect)).eq(true),
        5,
    )
    .case(
        Expr::col((alert::Entity, alert::Column::UserAssessmentCorrect)).eq(false),
        -2,
    )
    .finally(0)
    .into()
}

/// Open alerts not actively claimed by the requesting analyst, newest first.
///
/// Alerts claimed by *other* analysts stay visible so the queue reflects
/// everything still open on the range.
pub async fn main_queue(
    db: &DatabaseConnection,
    user_id: i32,
    filters: &AlertFilters,
) -> Result<Vec<QueueAlert>, ApiError> {
    let claimed_by_me = Query::select()
        .column(alert_investigation::Column::AlertId)
        .from(alert_investigation::Entity)
        .and_where(Expr::col(alert_investigation::Column::UserId).eq(user_id))
        .and_where(Expr::col(alert_investigation::Column::IsActive).eq(true))
        .to_owned();

    let select = alert::Entity::find()
        .column_as(severity_level::Column::SeverityName, "severity_name")
        .column_as(alert_type::Column::TypeName, "type_name")
        .join(JoinType::InnerJoin, alert::Relation::Severity.def())
        .join(JoinType::LeftJoin, alert::Relation::AlertType.def())
        .filter(alert::Column::IsClosed.eq(false))
        .filter(alert::Column::AlertId.not_in_subquery(claimed_by_me))
        .order_by_desc(alert::Column::EventTime);

    let rows = apply_alert_filters(select, filters)
        .into_model::<QueueAlert>()
        .all(db)
        .await?;
    Ok(rows)
}

/// Alerts actively claimed by the requesting analyst, newest first.
pub async fn my_queue(
    db: &DatabaseConnection,
    user_id: i32,
    filters: &AlertFilters,
) -> Result<Vec<InvestigationAlert>, ApiError> {
    let select = alert::Entity::find()
        .distinct()
        .column_as(severity_level::Column::SeverityName, "severity_name")
        .column_as(
            alert_investigation::Column::InvestigationId,
            "investigation_id",
        )
        .column_as(
            alert_investigation::Column::StartedAt,
            "investigation_started",
        )
        .column_as(alert_investigation::Column::Notes, "investigation_notes")
        .join(JoinType::InnerJoin, alert::Relation::Severity.def())
        .join(JoinType::InnerJoin, alert::Relation::Investigations.def())
        .filter(alert_investigation::Column::UserId.eq(user_id))
        .filter(alert_investigation::Column::IsActive.eq(true))
        .filter(alert::Column::IsClosed.eq(false))
        .order_by_desc(alert::Column::EventTime);

    let rows = apply_alert_filters(select, filters)
        .into_model::<InvestigationAlert>()
        .all(db)
        .await?;
    Ok(rows)
}

/// Alerts the requesting analyst has closed, with grading, newest first.
pub async fn closed_queue(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ClosedCaseRow>, ApiError> {
    let rows = alert::Entity::find()
        .select_only()
        .column(alert::Column::AlertId)
        .column(alert::Column::EventId)
        .column(alert::Column::EventTime)
        .column(alert::Column::RuleName)
        .column_as(severity_level::Column::SeverityName, "severity")
        .column_as(alert_type::Column::TypeName, "alert_type")
        .column(alert::Column::ExpectedResult)
        .column(alert::Column::UserAssessmentCorrect)
        .column_as(alert::Column::ClosureResult, "user_assessment")
        .column_as(points_expr(), "points")
        .column(alert::Column::AnswersProvided)
        .column(alert::Column::AnswersCorrect)
        .column(alert::Column::AnswersSummary)
        .column(alert::Column::ClosedAt)
        .join(JoinType::LeftJoin, alert::Relation::Severity.def())
        .join(JoinType::LeftJoin, alert::Relation::AlertType.def())
        .filter(alert::Column::IsClosed.eq(true))
        .filter(alert::Column::ClosedBy.eq(user_id))
        .order_by_desc(alert::Column::ClosedAt)
        .into_model::<ClosedCaseRow>()
        .all(db)
        .await?;
    Ok(rows)
}

/// All cases with assignee and status resolved, newest first.
pub async fn list_cases(
    db: &DatabaseConnection,
    filters: &CaseFilters,
) -> Result<Vec<CaseRow>, ApiError> {
    let mut select = case::Entity::find()
        .column_as(user::Column::Username, "assigned_to_name")
        .column_as(case_status::Column::StatusName, "case_status")
        .join(JoinType::InnerJoin, case::Relation::AssignedUser.def())
        .join(JoinType::InnerJoin, case::Relation::Status.def())
        .order_by_desc(case::Column::CreatedAt);

    if let Some(assigned_to) = filters.assigned_to {
        select = select.filter(case::Column::AssignedTo.eq(assigned_to));
    }
    if let Some(status) = filters.status.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((
                case_status::Entity,
                case_status::Column::StatusName,
            ))))
            .eq(status.to_lowercase()),
        );
    }

    let rows = select.into_model::<CaseRow>().all(db).await?;
    Ok(rows)
}

/// Drill-down for one alert. Two well-known detail fields are pulled up into
/// dedicated columns via aliased self-joins on `alert_details`.
pub async fn detail_for_event(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<AlertDetail, ApiError> {
    let fd = Alias::new("fd");
    let tr = Alias::new("tr");
    alert::Entity::find()
        .select_only()
        .column(alert::Column::EventId)
        .column(alert::Column::EventTime)
        .column(alert::Column::RuleName)
        .column_as(severity_level::Column::SeverityName, "level")
        .column_as(alert_type::Column::TypeName, "alert_type")
        .column(alert::Column::SourceIp)
        .column(alert::Column::DestinationIp)
        .column(alert::Column::Protocol)
        .column_as(
            Expr::col((fd.clone(), alert_detail::Column::FieldValue)),
            "firewall_action",
        )
        .column_as(
            Expr::col((tr.clone(), alert_detail::Column::FieldValue)),
            "trigger_reason",
        )
        .column_as(alert::Column::ClosureResult, "user_assessment")
        .column(alert::Column::ExpectedResult)
        .column(alert::Column::UserAssessmentCorrect)
        .column_as(points_expr(), "points")
        .join(JoinType::LeftJoin, alert::Relation::Severity.def())
        .join(JoinType::LeftJoin, alert::Relation::AlertType.def())
        .join_as(
            JoinType::LeftJoin,
            alert::Relation::Details.def().on_condition(|_left, right| {
                Expr::col((right, alert_detail::Column::FieldName))
                    .eq("Firewall Action")
                    .into_condition()
            }),
            fd,
        )
        .join_as(
            JoinType::LeftJoin,
            alert::Relation::Details.def().on_condition(|_left, right| {
                Expr::col((right, alert_detail::Column::FieldName))
                    .eq("Alert Trigger Reason")
                    .into_condition()
            }),
            tr,
        )
        .filter(alert::Column::EventId.eq(event_id))
        .into_model::<AlertDetail>()
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Alert not found".into()))
}
