//! Alert investigation lifecycle.
//!
//! Owns every state transition an alert can take: claim, release, escalate
//! into a case, close, reopen and the trainer-facing bulk reset. Read-side
//! queue projections live in [`crate::queues`].

use crate::entity::{alert, alert_investigation, case, case_status};
use crate::error::ApiError;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, TransactionTrait,
};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Optional fields for a case opened from an alert.
#[derive(Debug, Default)]
pub struct NewCase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub assigned_to: Option<i32>,
}

/// Analyst verdict recorded when closing an alert.
#[derive(Debug, Default)]
pub struct Closure {
    pub reason: Option<String>,
    pub result: Option<String>,
    pub malicious_entity: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug)]
pub struct ResetOutcome {
    pub alerts_reset: u64,
    pub investigations_cleared: u64,
}

#[derive(Debug)]
pub struct InvestigationLifecycle {
    db: Arc<DatabaseConnection>,
    open_status_id: i32,
}

impl InvestigationLifecycle {
    /// Resolve the "Open" case status id once at startup; every escalation
    /// reuses it instead of re-querying per request.
    pub async fn init(db: Arc<DatabaseConnection>) -> Result<Self, DbErr> {
        let open = case_status::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    case_status::Entity,
                    case_status::Column::StatusName,
                ))))
                .eq("open"),
            )
            .one(db.as_ref())
            .await?
            .ok_or_else(|| {
                DbErr::Custom("case_status is missing an 'Open' row; run migrations first".into())
            })?;
        Ok(InvestigationLifecycle {
            db,
            open_status_id: open.status_id,
        })
    }

    pub fn open_status_id(&self) -> i32 {
        self.open_status_id
    }

    /// Take ownership of an alert. The first analyst wins; a second claim is
    /// rejected as a conflict.
    ///
    /// Check and insert run without a transaction, so two truly simultaneous
    /// claims can both pass the ownership check and double-insert.
    #[tracing::instrument(skip(self))]
    pub async fn claim(
        &self,
        alert_id: i32,
        user_id: i32,
    ) -> Result<alert_investigation::Model, ApiError> {
        let db = self.db.as_ref();
        alert::Entity::find_by_id(alert_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Alert not found.".into()))?;

        let existing = alert_investigation::Entity::find()
            .filter(alert_investigation::Column::AlertId.eq(alert_id))
            .filter(alert_investigation::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if let Some(active) = existing {
            if active.user_id == user_id {
                return Err(ApiError::Validation("You already own this alert.".into()));
            }
            return Err(ApiError::Conflict(
                "Alert is already owned by another investigator.".into(),
            ));
        }

        let investigation = alert_investigation::ActiveModel {
            alert_id: Set(alert_id),
            user_id: Set(user_id),
            is_active: Set(true),
            started_at: Set(OffsetDateTime::now_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        tracing::info!(
            investigation_id = investigation.investigation_id,
            "alert claimed"
        );
        Ok(investigation)
    }

    /// Hand an alert back to the main queue. Stale inactive rows for the
    /// pair are deleted first so history keeps one row per analyst.
    #[tracing::instrument(skip(self))]
    pub async fn release(
        &self,
        alert_id: i32,
        user_id: i32,
    ) -> Result<alert_investigation::Model, ApiError> {
        let txn = self.db.begin().await?;

        alert_investigation::Entity::delete_many()
            .filter(alert_investigation::Column::AlertId.eq(alert_id))
            .filter(alert_investigation::Column::UserId.eq(user_id))
            .filter(alert_investigation::Column::IsActive.eq(false))
            .exec(&txn)
            .await?;

        let active = alert_investigation::Entity::find()
            .filter(alert_investigation::Column::AlertId.eq(alert_id))
            .filter(alert_investigation::Column::UserId.eq(user_id))
            .filter(alert_investigation::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound("No active investigation found for this alert.".into())
            })?;

        let mut released: alert_investigation::ActiveModel = active.into();
        released.is_active = Set(false);
        let released = released.update(&txn).await?;

        txn.commit().await?;
        tracing::info!(
            investigation_id = released.investigation_id,
            "alert released"
        );
        Ok(released)
    }

    /// Promote an alert into a formal case and mark the alert as under
    /// investigation. Case insert and alert update commit together.
    #[tracing::instrument(skip(self, new_case))]
    pub async fn escalate(
        &self,
        alert_id: i32,
        user_id: i32,
        new_case: NewCase,
    ) -> Result<case::Model, ApiError> {
        let txn = self.db.begin().await?;

        alert::Entity::find_by_id(alert_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound("Alert not found.".into()))?;

        let now = OffsetDateTime::now_utc();
        let created = case::ActiveModel {
            case_number: Set(format!("CASE-{}", Uuid::new_v4())),
            title: Set(new_case
                .title
                .unwrap_or_else(|| format!("Case for alert {alert_id}"))),
            description: Set(new_case.description),
            priority: Set(new_case.priority.unwrap_or(3)),
            status_id: Set(self.open_status_id),
            assigned_to: Set(Some(new_case.assigned_to.unwrap_or(user_id))),
            created_by: Set(user_id),
            alert_id: Set(Some(alert_id)),
            is_closed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        alert::Entity::update_many()
            .col_expr(alert::Column::Status, Expr::value("Under Investigation"))
            .col_expr(alert::Column::UpdatedAt, Expr::value(now))
            .filter(alert::Column::AlertId.eq(alert_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(
            case_id = created.case_id,
            case_number = %created.case_number,
            "alert escalated"
        );
        Ok(created)
    }

    /// Close an alert and any linked cases, grading the analyst verdict
    /// against the scenario's expected result. Re-closing simply overwrites
    /// the previous closure; ownership is not checked.
    #[tracing::instrument(skip(self, closure))]
    pub async fn close(
        &self,
        alert_id: i32,
        user_id: i32,
        closure: Closure,
    ) -> Result<alert::Model, ApiError> {
        let txn = self.db.begin().await?;

        let alert = alert::Entity::find_by_id(alert_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound("Alert not found.".into()))?;

        let correct = verdict_matches(closure.result.as_deref(), alert.expected_result.as_deref());
        let now = OffsetDateTime::now_utc();

        let mut closing: alert::ActiveModel = alert.into();
        closing.is_closed = Set(true);
        closing.closed_at = Set(Some(now));
        closing.closed_by = Set(Some(user_id));
        closing.status = Set("Closed".into());
        closing.closure_reason = Set(closure.reason);
        closing.closure_result = Set(closure.result);
        closing.user_assessment_correct = Set(Some(correct));
        closing.malicious_entity = Set(closure.malicious_entity);
        closing.feedback = Set(closure.feedback);
        closing.updated_at = Set(now);
        let closed = closing.update(&txn).await?;

        case::Entity::update_many()
            .col_expr(case::Column::IsClosed, Expr::value(true))
            .col_expr(case::Column::ClosedAt, Expr::value(Some(now)))
            .col_expr(case::Column::UpdatedAt, Expr::value(now))
            .filter(case::Column::AlertId.eq(alert_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(user_assessment_correct = correct, "alert closed");
        Ok(closed)
    }

    /// Flip a closed alert and its linked cases back to open. Only the
    /// `is_closed` flags change; closure metadata and status survive so the
    /// grading history can still be inspected. A missing alert is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn reopen(&self, alert_id: i32) -> Result<(), ApiError> {
        let db = self.db.as_ref();
        alert::Entity::update_many()
            .col_expr(alert::Column::IsClosed, Expr::value(false))
            .filter(alert::Column::AlertId.eq(alert_id))
            .exec(db)
            .await?;
        case::Entity::update_many()
            .col_expr(case::Column::IsClosed, Expr::value(false))
            .filter(case::Column::AlertId.eq(alert_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Trainer reset: reopen every closed alert, wipe all grading columns and
    /// deactivate every investigation, atomically.
    #[tracing::instrument(skip(self))]
    pub async fn reset_all(&self) -> Result<ResetOutcome, ApiError> {
        let txn = self.db.begin().await?;
        let now = OffsetDateTime::now_utc();

        let alerts = alert::Entity::update_many()
            .col_expr(alert::Column::IsClosed, Expr::value(false))
            .col_expr(alert::Column::Status, Expr::value("Open"))
            .col_expr(
                alert::Column::ClosedAt,
                Expr::value(Option::<OffsetDateTime>::None),
            )
            .col_expr(alert::Column::ClosedBy, Expr::value(Option::<i32>::None))
            .col_expr(
                alert::Column::ClosureReason,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                alert::Column::ClosureResult,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                alert::Column::ExpectedResult,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                alert::Column::UserAssessmentCorrect,
                Expr::value(Option::<bool>::None),
            )
            .col_expr(
                alert::Column::AnswersSummary,
                Expr::value(Option::<serde_json::Value>::None),
            )
            .col_expr(
                alert::Column::MaliciousEntity,
                Expr::value(Option::<String>::None),
            )
            .col_expr(alert::Column::Feedback, Expr::value(Option::<String>::None))
            .col_expr(alert::Column::AnswersProvided, Expr::value(false))
            .col_expr(alert::Column::AnswersCorrect, Expr::value(false))
            .col_expr(alert::Column::UpdatedAt, Expr::value(now))
            .filter(alert::Column::IsClosed.eq(true))
            .exec(&txn)
            .await?;

        let investigations = alert_investigation::Entity::update_many()
            .col_expr(alert_investigation::Column::IsActive, Expr::value(false))
            .filter(alert_investigation::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        let outcome = ResetOutcome {
            alerts_reset: alerts.rows_affected,
            investigations_cleared: investigations.rows_affected,
        };
        tracing::info!(
            alerts_reset = outcome.alerts_reset,
            investigations_cleared = outcome.investigations_cleared,
            "training range reset"
        );
        Ok(outcome)
    }
}

/// Grade a closure verdict against the scenario's expected result.
/// Comparison ignores surrounding whitespace and case; a missing side is
/// always graded as incorrect.
pub fn verdict_matches(result: Option<&str>, expected: Option<&str>) -> bool {
    match (result, expected) {
        (Some(r), Some(e)) => r.trim().to_lowercase() == e.trim().to_lowercase(),
        _ => false,
    }
}
