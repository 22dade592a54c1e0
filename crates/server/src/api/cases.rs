//! Case queue and questionnaire endpoints.

use crate::AppResources;
use crate::api::MessageResponse;
use crate::api::auth::AuthUser;
use crate::entity::{case, case_response};
use crate::error::{ApiError, ErrorBody};
use crate::queues::{self, CaseFilters, CaseRow, ClosedCaseRow};
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, EntityTrait};
use serde::Deserialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const CASES_TAG: &str = "Cases";

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveAnswersRequest {
    /// Questionnaire answers keyed by question id.
    pub answers: Option<serde_json::Value>,
    pub total_points: Option<i32>,
}

/// Case queue, or the closed-alert scoreboard when `status=closed`.
#[tracing::instrument(skip(resources, claims, filters), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/cases",
    tag = CASES_TAG,
    operation_id = "List Cases",
    summary = "List cases, or the analyst's closed-alert scoreboard",
    description = "Lists cases with their assignee and status resolved, newest first. \
                   `assigned_to` and `status` narrow the result.\n\n\
                   **Special case:** `status=closed` instead returns the requesting \
                   analyst's closed alerts with the grading outcome and points per row.",
    params(CaseFilters),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Case rows, or closed-alert rows when status=closed", body = [CaseRow]),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    )
)]
pub async fn list_cases(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Query(filters): Query<CaseFilters>,
) -> Result<Response, ApiError> {
    let db = resources.db.as_ref();
    if filters
        .status
        .as_deref()
        .is_some_and(|status| status.eq_ignore_ascii_case("closed"))
    {
        let rows: Vec<ClosedCaseRow> = queues::closed_queue(db, claims.user_id).await?;
        return Ok(Json(rows).into_response());
    }
    let rows: Vec<CaseRow> = queues::list_cases(db, &filters).await?;
    Ok(Json(rows).into_response())
}

/// Save questionnaire answers for a case.
#[tracing::instrument(skip(resources, claims, payload), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/cases/{id}/answers",
    tag = CASES_TAG,
    operation_id = "Save Answers",
    summary = "Save questionnaire answers for a case",
    description = "Stores the requesting analyst's questionnaire answers and points for \
                   the case. Re-submitting replaces the stored answers instead of adding \
                   a second row.",
    params(("id" = i32, Path, description = "Case id")),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Answers stored", body = MessageResponse),
        (status = 404, description = "Unknown case", body = ErrorBody),
    )
)]
pub async fn save_answers(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(case_id): Path<i32>,
    Json(payload): Json<SaveAnswersRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let db = resources.db.as_ref();
    case::Entity::find_by_id(case_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Case not found.".to_owned()))?;

    let now = OffsetDateTime::now_utc();
    let row = case_response::ActiveModel {
        case_id: Set(case_id),
        user_id: Set(claims.user_id),
        answers: Set(payload.answers.unwrap_or_else(|| serde_json::json!({}))),
        total_points: Set(payload.total_points.unwrap_or(0)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    case_response::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                case_response::Column::CaseId,
                case_response::Column::UserId,
            ])
            .update_columns([
                case_response::Column::Answers,
                case_response::Column::TotalPoints,
                case_response::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(Json(MessageResponse::new("Answers saved successfully")))
}
