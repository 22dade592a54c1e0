//! Threat-intelligence lookup endpoints.

use crate::AppResources;
use crate::api::auth::AuthUser;
use crate::error::{ApiError, ErrorBody};
use crate::intel::ScanSummary;
use axum::extract::Query;
use axum::{Extension, Json};
use serde::Deserialize;
use utoipa::IntoParams;

/// Tag for OpenAPI documentation.
pub const INTEL_TAG: &str = "Intel";

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScanQuery {
    /// IP address, domain or file hash to look up.
    pub query: Option<String>,
}

/// Look up an indicator against the configured intelligence API.
#[tracing::instrument(skip(resources, claims, params), fields(user_id = claims.user_id))]
#[utoipa::path(
    get,
    path = "/api/intel/scan",
    tag = INTEL_TAG,
    operation_id = "Scan Indicator",
    summary = "Look up an IP, domain or file hash",
    description = "Classifies the query as an IP address, domain or file hash, fetches \
                   the matching report from the upstream intelligence API and condenses \
                   it down to the engines that flagged the indicator as malicious.",
    params(ScanQuery),
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Condensed scan verdict", body = ScanSummary),
        (status = 400, description = "Missing or unclassifiable query", body = ErrorBody),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "Indicator unknown upstream", body = ErrorBody),
    )
)]
pub async fn scan(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Query(params): Query<ScanQuery>,
) -> Result<Json<ScanSummary>, ApiError> {
    let Some(query) = params.query.filter(|query| !query.is_empty()) else {
        return Err(ApiError::Validation(
            "Query parameter is required.".to_owned(),
        ));
    };
    let summary = resources.intel.scan(&query).await?;
    Ok(Json(summary))
}
