//! Authentication extractor for the analyst API.

use crate::AppResources;
use crate::auth::token::{Claims, validate_token};
use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Axum extractor for the `Authorization: Bearer <jwt>` header.
///
/// Missing credentials reject with 401; present but invalid or expired
/// credentials reject with 403. Validation is purely cryptographic, so no
/// database round-trip happens per request.
///
/// # Example
///
/// ```ignore
/// async fn handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}", claims.username)
/// }
/// ```
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppResources not found in extensions");
                ApiError::Internal("AppResources not found in extensions".into())
            })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => &header[7..],
            Some(_) => {
                return Err(ApiError::Unauthorized(
                    "Authorization header must use Bearer scheme".into(),
                ));
            }
            None => {
                return Err(ApiError::Unauthorized(
                    "Missing Authorization header".into(),
                ));
            }
        };

        let claims = validate_token(token, &resources.config.jwt_secret)
            .map_err(|_| ApiError::Forbidden("Invalid or expired token".into()))?;

        Ok(AuthUser(claims))
    }
}
