//! Handlers for the `/user` resource: registration, profile, lookups, and
//! admin account management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use dentapp_core::error::CoreError;
use dentapp_core::roles::UserRole;
use dentapp_core::types::DbId;
use dentapp_db::models::user::{CreateUser, UpdateUser, UserResponse};
use dentapp_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /user/signup`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub role: UserRole,
}

/// POST /user/signup (public)
///
/// Register a new staff account. The password is stored as an Argon2id
/// hash; duplicate usernames and emails are rejected before insert.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if UserRepo::exists_by_username(&state.pool, &input.username).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already exists".into(),
        )));
    }
    if UserRepo::exists_by_email(&state.pool, &input.email).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: input.username,
        email: input.email,
        password_hash,
        first_name: input.first_name,
        middle_name: input.middle_name,
        last_name: input.last_name,
        role: input.role,
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, role = %user.role, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /user/profile
///
/// The authenticated caller's own profile.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<UserResponse>> {
    let profile = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id,
        }))?;

    Ok(Json(UserResponse::from(profile)))
}

/// GET /user/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "user", id }))?;

    Ok(Json(UserResponse::from(user)))
}

/// GET /user/username/{username}
pub async fn get_user_by_username(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    Ok(Json(UserResponse::from(user)))
}

/// GET /user/all (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /user/active (admin only)
pub async fn list_active_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list_active(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /user/role/{role} (admin only)
pub async fn list_users_by_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(role): Path<UserRole>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list_by_role(&state.pool, role).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /user/admin/{id} (admin only)
///
/// Partial update. A changed email must not belong to another account.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if let Some(email) = &input.email {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
            if existing.id != id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Email already exists".into(),
                )));
            }
        }
    }

    let updated = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "user", id }))?;

    Ok(Json(UserResponse::from(updated)))
}

/// DELETE /user/admin/{id} (admin only)
///
/// Soft deactivation; repeat calls are a no-op success.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse>> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "user", id }))?;

    UserRepo::deactivate(&state.pool, id).await?;

    Ok(Json(ApiResponse::ok("User deactivated successfully")))
}
