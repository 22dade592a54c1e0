//! Raw log search endpoints.

use crate::AppResources;
use crate::api::auth::AuthUser;
use crate::entity::log_entry;
use crate::error::{ApiError, ErrorBody};
use crate::logs::{self, LogPage, LogQuery};
use axum::extract::{Path, Query};
use axum::{Extension, Json};

/// Tag for OpenAPI documentation.
pub const LOGS_TAG: &str = "Logs";

/// Paginated log search.
#[tracing::instrument(skip(resources, claims, query), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = LOGS_TAG,
    operation_id = "Search Logs",
    summary = "Search the raw log store",
    description = "Paginated search over the raw log store, newest first.\n\n\
                   Filterable fields: `source_ip`, `destination_ip`, `log_source`, \
                   `event_id` and `raw_log`. Operators: `equals` (exact, case-sensitive), \
                   `contains`, `startswith` and `endswith` (case-insensitive). An unknown \
                   field or an empty value disables filtering instead of erroring.",
    params(LogQuery),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "One page of log rows plus the total match count", body = LogPage),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    )
)]
pub async fn search_logs(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogPage>, ApiError> {
    let page = logs::search_logs(resources.db.as_ref(), &query).await?;
    Ok(Json(page))
}

/// Single log row by id.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/logs/{id}",
    tag = LOGS_TAG,
    operation_id = "Log Detail",
    summary = "Fetch one raw log row",
    description = "Returns a single log row by primary key, for the drill-down view an \
                   analyst pivots into from an alert.",
    params(("id" = i32, Path, description = "Log id")),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Log row", body = log_entry::Model),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "Unknown log id", body = ErrorBody),
    )
)]
pub async fn log_detail(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(log_id): Path<i32>,
) -> Result<Json<log_entry::Model>, ApiError> {
    let row = logs::find_log(resources.db.as_ref(), log_id).await?;
    Ok(Json(row))
}
