//! Account endpoints: registration, login and self-service management.

use crate::AppResources;
use crate::api::MessageResponse;
use crate::api::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::issue_token;
use crate::entity::user;
use crate::error::{ApiError, ErrorBody};
use axum::{Extension, Json};
use hyper::StatusCode;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const ACCOUNTS_TAG: &str = "Accounts";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "redirectTo")]
    pub redirect_to: String,
}

/// Register a new analyst account.
#[tracing::instrument(skip(resources, payload))]
#[utoipa::path(
    post,
    path = "/register",
    tag = ACCOUNTS_TAG,
    operation_id = "Register",
    summary = "Register a new analyst account",
    description = "Creates an analyst account with an Argon2id-hashed password.\n\n\
                   Usernames are unique among live accounts; soft-deleting an account \
                   frees its username for re-registration.",
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing username or password", body = ErrorBody),
        (status = 409, description = "Username already taken", body = ErrorBody),
    )
)]
pub async fn register(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (Some(username), Some(password)) =
        (non_empty(payload.username), non_empty(payload.password))
    else {
        return Err(ApiError::Validation(
            "Username and password are required.".into(),
        ));
    };

    let db = resources.db.as_ref();
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .is_some();
    if taken {
        return Err(ApiError::Conflict("Username already exists.".into()));
    }

    let password_hash = hash_password(&password)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))?;

    user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        email: Set(non_empty(payload.email)),
        created_at: Set(OffsetDateTime::now_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully! Redirecting to login...".into(),
            redirect_to: "/login".into(),
        }),
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub user_id: i32,
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// Exchange credentials for a session token.
#[tracing::instrument(skip(resources, payload))]
#[utoipa::path(
    post,
    path = "/login",
    tag = ACCOUNTS_TAG,
    operation_id = "Login",
    summary = "Exchange credentials for a session token",
    description = "Verifies the password and issues a signed session token.\n\n\
                   Unknown usernames and wrong passwords produce the same response, so \
                   the endpoint cannot be used to probe which accounts exist.",
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    )
)]
pub async fn login(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(username), Some(password)) =
        (non_empty(payload.username), non_empty(payload.password))
    else {
        return Err(ApiError::Validation(
            "Username and password are required.".into(),
        ));
    };

    let account = user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .filter(user::Column::DeletedAt.is_null())
        .one(resources.db.as_ref())
        .await?;
    let valid = account
        .as_ref()
        .is_some_and(|a| verify_password(&password, &a.password_hash));
    let Some(account) = account.filter(|_| valid) else {
        return Err(ApiError::Unauthorized(
            "Invalid username or password.".into(),
        ));
    };

    let token = issue_token(
        account.user_id,
        &account.username,
        &resources.config.jwt_secret,
        resources.config.token_ttl_minutes,
    )
    .map_err(|e| ApiError::Internal(format!("failed to issue token: {e}")))?;

    tracing::info!(user_id = account.user_id, "analyst logged in");
    Ok(Json(LoginResponse {
        message: "Login successful!".into(),
        token,
        user: UserSummary {
            user_id: account.user_id,
            username: account.username,
        },
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckUsernameRequest {
    pub username: Option<String>,
}

/// Check whether a username exists before the password-reset flow.
#[tracing::instrument(skip(resources, payload))]
#[utoipa::path(
    post,
    path = "/api/check-username",
    tag = ACCOUNTS_TAG,
    operation_id = "Check Username",
    summary = "Check whether a username exists",
    responses(
        (status = 200, description = "User found", body = MessageResponse),
        (status = 400, description = "Missing username", body = ErrorBody),
        (status = 404, description = "Unknown username", body = ErrorBody),
    )
)]
pub async fn check_username(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<CheckUsernameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(username) = non_empty(payload.username) else {
        return Err(ApiError::Validation("Username is required.".into()));
    };

    user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .filter(user::Column::DeletedAt.is_null())
        .one(resources.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".into()))?;

    Ok(Json(MessageResponse::new("User found.")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub username: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
    #[serde(rename = "confirmNewPassword")]
    pub confirm_new_password: Option<String>,
}

/// Reset a password by username.
#[tracing::instrument(skip(resources, payload))]
#[utoipa::path(
    post,
    path = "/api/forgot-password",
    tag = ACCOUNTS_TAG,
    operation_id = "Forgot Password",
    summary = "Reset a password by username",
    description = "Training-range shortcut: anyone who knows a username can reset its \
                   password, no email round-trip involved.",
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Missing or mismatched fields", body = ErrorBody),
        (status = 404, description = "Unknown username", body = ErrorBody),
    )
)]
pub async fn forgot_password(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(username), Some(new_password), Some(confirm)) = (
        non_empty(payload.username),
        non_empty(payload.new_password),
        non_empty(payload.confirm_new_password),
    ) else {
        return Err(ApiError::Validation(
            "Username, new password, and confirm password are required.".into(),
        ));
    };
    if new_password != confirm {
        return Err(ApiError::Validation(
            "New password and confirm password do not match.".into(),
        ));
    }

    let db = resources.db.as_ref();
    let account = user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".into()))?;

    let password_hash = hash_password(&new_password)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))?;
    let mut update: user::ActiveModel = account.into();
    update.password_hash = Set(password_hash);
    update.update(db).await?;

    Ok(Json(MessageResponse::new(
        "Password has been reset successfully.",
    )))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
    #[serde(rename = "confirmNewPassword")]
    pub confirm_new_password: Option<String>,
}

/// Change the authenticated analyst's password.
#[tracing::instrument(skip(resources, claims, payload), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/change-password",
    tag = ACCOUNTS_TAG,
    operation_id = "Change Password",
    summary = "Change the authenticated analyst's password",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing or mismatched fields", body = ErrorBody),
        (status = 401, description = "Wrong current password or missing token", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody),
    )
)]
pub async fn change_password(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(current), Some(new_password), Some(confirm)) = (
        non_empty(payload.current_password),
        non_empty(payload.new_password),
        non_empty(payload.confirm_new_password),
    ) else {
        return Err(ApiError::Validation(
            "All password fields are required.".into(),
        ));
    };
    if new_password != confirm {
        return Err(ApiError::Validation(
            "New password and confirm password do not match.".into(),
        ));
    }

    let db = resources.db.as_ref();
    let account = user::Entity::find_by_id(claims.user_id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".into()))?;

    if !verify_password(&current, &account.password_hash) {
        return Err(ApiError::Unauthorized("Incorrect current password.".into()));
    }

    let password_hash = hash_password(&new_password)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))?;
    let mut update: user::ActiveModel = account.into();
    update.password_hash = Set(password_hash);
    update.update(db).await?;

    Ok(Json(MessageResponse::new("Password changed successfully.")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmailRequest {
    pub email: Option<String>,
}

/// Update the authenticated analyst's email address.
#[tracing::instrument(skip(resources, claims, payload), fields(user_id = claims.user_id))]
#[utoipa::path(
    post,
    path = "/api/update-email",
    tag = ACCOUNTS_TAG,
    operation_id = "Update Email",
    summary = "Update the authenticated analyst's email address",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Email updated", body = MessageResponse),
        (status = 400, description = "Missing email", body = ErrorBody),
    )
)]
pub async fn update_email(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(email) = non_empty(payload.email) else {
        return Err(ApiError::Validation("Email is required.".into()));
    };

    user::Entity::update_many()
        .col_expr(user::Column::Email, Expr::value(Some(email)))
        .filter(user::Column::UserId.eq(claims.user_id))
        .exec(resources.db.as_ref())
        .await?;

    Ok(Json(MessageResponse::new("Email updated successfully.")))
}

/// Soft-delete the authenticated analyst's account.
#[tracing::instrument(skip(resources, claims), fields(user_id = claims.user_id))]
#[utoipa::path(
    delete,
    path = "/api/delete-account",
    tag = ACCOUNTS_TAG,
    operation_id = "Delete Account",
    summary = "Soft-delete the authenticated analyst's account",
    description = "Marks the account as deleted instead of removing the row, so closed \
                   alerts and investigation history keep a valid author.",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Account soft-deleted", body = MessageResponse),
    )
)]
pub async fn delete_account(
    Extension(resources): Extension<AppResources>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    user::Entity::update_many()
        .col_expr(
            user::Column::DeletedAt,
            Expr::value(Some(OffsetDateTime::now_utc())),
        )
        .filter(user::Column::UserId.eq(claims.user_id))
        .exec(resources.db.as_ref())
        .await?;

    tracing::info!(user_id = claims.user_id, "account soft-deleted");
    Ok(Json(MessageResponse::new(
        "Account soft-deleted successfully.",
    )))
}
