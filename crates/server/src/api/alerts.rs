//! Alert queue endpoints: the shared main queue, the analyst's personal
//! queue and the single-alert drill-down.

use crate::AppResources;
use crate::api::auth::AuthUser;
use crate::error::{ApiError, ErrorBody};
use crate::queues::{self, AlertDetail, AlertFilters, InvestigationAlert, QueueAlert};
use axum::extract::{Path, Query};
use axum::{Extension, Json};

/// Tag for OpenAPI documentation.
pub const ALERTS_TAG: &str = "Alert Queues";

/// Main alert queue.
#[tracing::instrument(skip(resources, claims, filters), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = ALERTS_TAG,
    operation_id = "Main Queue",
    summary = "List open alerts available to the requesting analyst",
    description = "Returns open alerts not actively claimed by the requesting analyst, \
                   newest first. Alerts claimed by other analysts stay visible.\n\n\
                   **Filters:** `severity` and `status` match case-insensitively; `filter` \
                   free-text matches the event id and raw message.",
    params(AlertFilters),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Open alerts", body = [QueueAlert]),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    )
)]
pub async fn main_queue(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Query(filters): Query<AlertFilters>,
) -> Result<Json<Vec<QueueAlert>>, ApiError> {
    let rows = queues::main_queue(resources.db.as_ref(), claims.user_id, &filters).await?;
    Ok(Json(rows))
}

/// Personal investigation queue.
#[tracing::instrument(skip(resources, claims, filters), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/investigation-alerts",
    tag = ALERTS_TAG,
    operation_id = "My Queue",
    summary = "List alerts the requesting analyst is investigating",
    description = "Returns the alerts actively claimed by the requesting analyst, with \
                   the claim metadata joined in. Accepts the same filters as the main \
                   queue.",
    params(AlertFilters),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Claimed alerts", body = [InvestigationAlert]),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    )
)]
pub async fn my_queue(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Query(filters): Query<AlertFilters>,
) -> Result<Json<Vec<InvestigationAlert>>, ApiError> {
    let rows = queues::my_queue(resources.db.as_ref(), claims.user_id, &filters).await?;
    Ok(Json(rows))
}

/// Single-alert drill-down.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/alerts/{id}",
    tag = ALERTS_TAG,
    operation_id = "Alert Detail",
    summary = "Drill into one alert by SIEM event id",
    description = "Returns the investigation view of a single alert: severity and type \
                   labels, the firewall action and trigger reason detail fields, and the \
                   grading outcome with points once the alert has been closed.",
    params(("id" = i64, Path, description = "SIEM event id of the alert")),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Alert detail", body = AlertDetail),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "Unknown event id", body = ErrorBody),
    )
)]
pub async fn alert_detail(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<AlertDetail>, ApiError> {
    let detail = queues::detail_for_event(resources.db.as_ref(), event_id).await?;
    Ok(Json(detail))
}
