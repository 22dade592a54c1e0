//! Investigation lifecycle endpoints: claim, release, escalate, close,
//! reopen and the bulk reset.

use crate::AppResources;
use crate::api::MessageResponse;
use crate::api::auth::AuthUser;
use crate::entity::{alert, alert_investigation, case};
use crate::error::{ApiError, ErrorBody};
use crate::lifecycle::{Closure, NewCase};
use axum::extract::Path;
use axum::{Extension, Json};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const INVESTIGATIONS_TAG: &str = "Investigations";

/// Subset of the investigation row echoed back on a successful claim.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvestigationSummary {
    pub investigation_id: i32,
    pub alert_id: i32,
    pub user_id: i32,
    pub started_at: OffsetDateTime,
}

impl From<alert_investigation::Model> for InvestigationSummary {
    fn from(model: alert_investigation::Model) -> Self {
        Self {
            investigation_id: model.investigation_id,
            alert_id: model.alert_id,
            user_id: model.user_id,
            started_at: model.started_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub success: bool,
    pub message: String,
    pub investigation: InvestigationSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReleaseResponse {
    pub success: bool,
    pub investigation: alert_investigation::Model,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub assigned_to: Option<i32>,
}

/// Subset of the created case echoed back to the client.
#[derive(Debug, Serialize, ToSchema)]
pub struct EscalatedCase {
    pub case_id: i32,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub alert_id: Option<i32>,
    pub created_at: OffsetDateTime,
}

impl From<case::Model> for EscalatedCase {
    fn from(model: case::Model) -> Self {
        Self {
            case_id: model.case_id,
            case_number: model.case_number,
            title: model.title,
            description: model.description,
            alert_id: model.alert_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EscalateResponse {
    pub success: bool,
    pub message: String,
    pub case: EscalatedCase,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseAlertRequest {
    pub reason: Option<String>,
    pub result: Option<String>,
    pub malicious_entity: Option<String>,
    pub feedback: Option<String>,
}

/// Subset of the closed alert echoed back with the grading outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClosedAlertSummary {
    pub alert_id: i32,
    pub event_id: i64,
    pub rule_name: String,
    pub closure_result: Option<String>,
    pub expected_result: Option<String>,
    pub user_assessment_correct: Option<bool>,
    pub malicious_entity: Option<String>,
    pub feedback: Option<String>,
    pub closed_at: Option<OffsetDateTime>,
}

impl From<alert::Model> for ClosedAlertSummary {
    fn from(model: alert::Model) -> Self {
        Self {
            alert_id: model.alert_id,
            event_id: model.event_id,
            rule_name: model.rule_name,
            closure_result: model.closure_result,
            expected_result: model.expected_result,
            user_assessment_correct: model.user_assessment_correct,
            malicious_entity: model.malicious_entity,
            feedback: model.feedback,
            closed_at: model.closed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CloseAlertResponse {
    pub message: String,
    pub alert: ClosedAlertSummary,
}

/// Claim an alert.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/start-investigation",
    tag = INVESTIGATIONS_TAG,
    operation_id = "Start Investigation",
    summary = "Take ownership of an alert",
    description = "Claims the alert for the requesting analyst so it moves from the main \
                   queue into their personal queue. The first claim wins: a repeat claim \
                   by the owner is a validation error, a claim on an alert owned by \
                   someone else a conflict.",
    params(("id" = i32, Path, description = "Alert id")),
    security(("Authorization" = [])),
    responses(
        (status = 201, description = "Ownership taken", body = ClaimResponse),
        (status = 400, description = "Already owned by the caller", body = ErrorBody),
        (status = 404, description = "Unknown alert", body = ErrorBody),
        (status = 409, description = "Owned by another analyst", body = ErrorBody),
    )
)]
pub async fn start_investigation(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(alert_id): Path<i32>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let investigation = resources.lifecycle.claim(alert_id, claims.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ClaimResponse {
            success: true,
            message: "Ownership taken successfully.".to_owned(),
            investigation: investigation.into(),
        }),
    ))
}

/// Release an alert back to the main queue.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/unassign",
    tag = INVESTIGATIONS_TAG,
    operation_id = "Unassign Alert",
    summary = "Release a claimed alert",
    description = "Deactivates the requesting analyst's investigation on the alert so it \
                   returns to the main queue. Only the current owner can release.",
    params(("id" = i32, Path, description = "Alert id")),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Claim released", body = ReleaseResponse),
        (status = 404, description = "No active claim by the caller", body = ErrorBody),
    )
)]
pub async fn unassign(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(alert_id): Path<i32>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let investigation = resources.lifecycle.release(alert_id, claims.user_id).await?;
    Ok(Json(ReleaseResponse {
        success: true,
        investigation,
    }))
}

/// Escalate an alert into a case.
#[tracing::instrument(skip(resources, claims, payload), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/create-case",
    tag = INVESTIGATIONS_TAG,
    operation_id = "Create Case",
    summary = "Escalate an alert into a case",
    description = "Creates a case linked to the alert and moves the alert to \
                   `Under Investigation`. The case number is generated server-side; \
                   title, description, priority and assignee are optional and default to \
                   a generated title, priority 3 and the requesting analyst.",
    params(("id" = i32, Path, description = "Alert id")),
    security(("Authorization" = [])),
    responses(
        (status = 201, description = "Case created", body = EscalateResponse),
        (status = 404, description = "Unknown alert", body = ErrorBody),
    )
)]
pub async fn create_case(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(alert_id): Path<i32>,
    Json(payload): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<EscalateResponse>), ApiError> {
    let new_case = NewCase {
        title: payload.title,
        description: payload.description,
        priority: payload.priority,
        assigned_to: payload.assigned_to,
    };
    let case = resources
        .lifecycle
        .escalate(alert_id, claims.user_id, new_case)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(EscalateResponse {
            success: true,
            message: "Case created successfully and linked to alert.".to_owned(),
            case: case.into(),
        }),
    ))
}

/// Close an alert and grade the verdict.
#[tracing::instrument(skip(resources, claims, payload), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/close-alert",
    tag = INVESTIGATIONS_TAG,
    operation_id = "Close Alert",
    summary = "Close an alert with a verdict",
    description = "Closes the alert, grades the analyst's `result` against the expected \
                   verdict and closes any case linked to the alert in the same \
                   transaction. The grading outcome comes back in the response.",
    params(("id" = i32, Path, description = "Alert id")),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Alert closed and graded", body = CloseAlertResponse),
        (status = 404, description = "Unknown alert", body = ErrorBody),
    )
)]
pub async fn close_alert(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(alert_id): Path<i32>,
    Json(payload): Json<CloseAlertRequest>,
) -> Result<Json<CloseAlertResponse>, ApiError> {
    let closure = Closure {
        reason: payload.reason,
        result: payload.result,
        malicious_entity: payload.malicious_entity,
        feedback: payload.feedback,
    };
    let alert = resources
        .lifecycle
        .close(alert_id, claims.user_id, closure)
        .await?;
    Ok(Json(CloseAlertResponse {
        message: "Alert and linked case closed successfully.".to_owned(),
        alert: alert.into(),
    }))
}

/// Reopen a closed alert and its case.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    patch,
    path = "/api/cases/{id}/reopen",
    tag = INVESTIGATIONS_TAG,
    operation_id = "Reopen Case",
    summary = "Reopen a closed alert and its linked cases",
    description = "Flips the closed flag back off on the alert and every case linked to \
                   it. Closure metadata and the alert status are left untouched so the \
                   previous verdict stays visible. Reopening an unknown alert is a \
                   no-op.",
    params(("id" = i32, Path, description = "Alert id the case is linked to")),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Reopened", body = MessageResponse),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    )
)]
pub async fn reopen_case(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(alert_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    resources.lifecycle.reopen(alert_id).await?;
    Ok(Json(MessageResponse::new(
        "Case and alert reopened successfully",
    )))
}

/// Reset the whole training range.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/reset-alerts",
    tag = INVESTIGATIONS_TAG,
    operation_id = "Reset Alerts",
    summary = "Reset every closed alert for a fresh training run",
    description = "Reopens every closed alert, wipes closure metadata and grading, and \
                   deactivates every active investigation in one transaction. Cases are \
                   left alone.",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Range reset", body = MessageResponse),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    )
)]
pub async fn reset_alerts(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    resources.lifecycle.reset_all().await?;
    Ok(Json(MessageResponse::new(
        "All alerts and investigations have been reset.",
    )))
}
