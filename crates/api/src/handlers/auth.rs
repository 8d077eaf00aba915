//! Handlers for the `/auth` resource: login, refresh, logout, logout-all,
//! current-user, token validation, refresh hints, and session cleanup.
//!
//! Login failures never distinguish "no such user" from "wrong password";
//! both collapse into one generic message so the endpoint cannot be used to
//! enumerate accounts. Unexpected internal failures surface to callers only
//! as the masked 500 envelope -- detail goes to the logs.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use dentapp_core::error::CoreError;
use dentapp_db::models::session::CreateSession;
use dentapp_db::models::user::UserResponse;
use dentapp_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::cookies::{
    access_token_cookie, clear_auth_cookies, set_auth_cookies, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use crate::auth::jwt::{
    decode_claims, generate_access_token, generate_refresh_token, should_refresh as token_should_refresh,
    time_until_expiration_ms, validate_access_token, validate_refresh_token,
};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh-token`.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Successful login response. Tokens travel in cookies, not the body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub success: bool,
    pub user: UserResponse,
    pub session_id: String,
    /// Access token lifetime in milliseconds.
    pub access_token_expires_in: i64,
    /// Refresh token lifetime in milliseconds.
    pub refresh_token_expires_in: i64,
}

/// Successful refresh response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub success: bool,
    /// New access token lifetime in milliseconds.
    pub access_token_expires_in: i64,
    pub session_id: String,
}

/// Response for `GET /auth/should-refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShouldRefreshResponse {
    pub should_refresh: bool,
    /// Milliseconds until the access token expires (negative once past).
    pub time_until_expiration: i64,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/login
///
/// Authenticate with username + password. On success, creates a session,
/// sets both credential cookies, and returns the session id plus token
/// lifetimes.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    // 1. Find user by username. Absent users and wrong passwords produce
    //    the same response.
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    // 2. Verify password. Deactivated accounts fail identically.
    if !verify_password(&input.password, &user.password_hash) || !user.is_active {
        return Err(invalid_credentials());
    }

    // 3. Mint the token pair and persist the session.
    let session_id = Uuid::new_v4().to_string();

    let access_token = generate_access_token(&user.username, user.role, user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token =
        generate_refresh_token(&user.username, user.id, &session_id, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let session_input = CreateSession {
        session_id: session_id.clone(),
        user_id: user.id,
        refresh_token: refresh_token.clone(),
        ip_address: extract_ip_address(&headers),
        user_agent: extract_user_agent(&headers),
        expires_at: Utc::now() + chrono::Duration::seconds(state.config.jwt.refresh_token_expiry_secs),
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    tracing::info!(user_id = user.id, %session_id, "login successful");

    let jar = set_auth_cookies(jar, access_token, refresh_token, &state.config);

    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            success: true,
            user: UserResponse::from(user),
            session_id,
            access_token_expires_in: state.config.jwt.access_token_expiry_ms(),
            refresh_token_expires_in: state.config.jwt.refresh_token_expiry_ms(),
        }),
    ))
}

/// POST /auth/refresh
///
/// Exchange the refresh cookie for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<RefreshResponse>)> {
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Refresh token not found".into()))
        })?;
    refresh_access_token(&state, &token, jar).await
}

/// POST /auth/refresh-token
///
/// Same as `/auth/refresh` but reads the refresh token from the body, for
/// clients that cannot send cookies.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<RefreshTokenRequest>,
) -> AppResult<(CookieJar, Json<RefreshResponse>)> {
    refresh_access_token(&state, &input.refresh_token, jar).await
}

/// POST /auth/logout
///
/// Revoke the session bound to the refresh cookie, if any, and clear both
/// credential cookies. Idempotent: succeeds whether or not a session was
/// found, so repeated logouts are harmless.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse>)> {
    let refresh_token = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());

    if let Some(token) = refresh_token {
        if !token.trim().is_empty() {
            if let Some(session) =
                SessionRepo::find_active_by_refresh_token(&state.pool, &token).await?
            {
                SessionRepo::revoke(&state.pool, &session.session_id).await?;
                tracing::info!(session_id = %session.session_id, "session revoked on logout");
            }
        }
    }

    let jar = clear_auth_cookies(jar, &state.config);
    Ok((jar, Json(ApiResponse::ok("Logged out successfully"))))
}

/// POST /auth/logout-all
///
/// Revoke every active session for the authenticated user and clear the
/// caller's credential cookies.
pub async fn logout_all(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse>)> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, user.user_id).await?;
    tracing::info!(user_id = user.user_id, revoked, "all sessions revoked");

    let jar = clear_auth_cookies(jar, &state.config);
    Ok((
        jar,
        Json(ApiResponse::ok("All sessions logged out successfully")),
    ))
}

/// GET /auth/me
///
/// Resolve the access cookie to the caller's profile. Any verification
/// failure is a plain 401; no distinction between missing, malformed, and
/// expired credentials.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let profile = UserRepo::find_by_username(&state.pool, &user.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

    Ok(Json(UserResponse::from(profile)))
}

/// GET /auth/validate
///
/// Lightweight liveness check for the access cookie.
pub async fn validate(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<ApiResponse>> {
    let token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Access token not found".into()))
        })?;

    if validate_access_token(&token, &state.config.jwt).is_none() {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Token is invalid or expired".into(),
        )));
    }

    Ok(Json(ApiResponse::ok("Token is valid")))
}

/// GET /auth/should-refresh
///
/// Advisory hint: true when the access token has under two minutes of
/// lifetime left. Never enforced server-side.
pub async fn should_refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<ShouldRefreshResponse>> {
    let token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Access token not found".into()))
        })?;

    let claims = decode_claims(&token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Token is invalid or expired".into()))
    })?;

    Ok(Json(ShouldRefreshResponse {
        should_refresh: token_should_refresh(&claims),
        time_until_expiration: time_until_expiration_ms(&claims),
        message: "Token refresh check completed".to_string(),
    }))
}

/// POST /auth/cleanup-sessions (admin only)
///
/// Delete sessions that are expired or revoked. Scheduling is a deployment
/// concern; this endpoint is the only trigger.
pub async fn cleanup_sessions(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<ApiResponse>> {
    let removed = SessionRepo::cleanup_expired_and_inactive(&state.pool, Utc::now()).await?;
    tracing::info!(admin_id = admin.user_id, removed, "session cleanup complete");

    Ok(Json(ApiResponse::ok(
        "Expired sessions cleaned up successfully",
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The merged login failure. One message for unknown users, wrong
/// passwords, and deactivated accounts.
fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

/// Verify a refresh token, resolve its active session, and mint a new
/// access token. The session row's own expiry is authoritative: an expired
/// row is deactivated here even though the token may still verify.
async fn refresh_access_token(
    state: &AppState,
    refresh_token: &str,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<RefreshResponse>)> {
    if refresh_token.trim().is_empty() {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Refresh token is required".into(),
        )));
    }

    if validate_refresh_token(refresh_token, &state.config.jwt).is_none() {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid refresh token".into(),
        )));
    }

    let session = SessionRepo::find_active_by_refresh_token(&state.pool, refresh_token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Session not found or expired".into(),
            ))
        })?;

    if session.is_expired() {
        SessionRepo::revoke(&state.pool, &session.session_id).await?;
        tracing::info!(session_id = %session.session_id, "expired session deactivated on refresh");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Session expired".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Session not found or expired".into(),
            ))
        })?;

    let access_token = generate_access_token(&user.username, user.role, user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    // The refresh token itself is not rotated; only last_accessed moves.
    SessionRepo::touch(&state.pool, &session.session_id).await?;

    let jar = jar.add(access_token_cookie(access_token, &state.config));

    Ok((
        jar,
        Json(RefreshResponse {
            message: "Access token refreshed successfully".to_string(),
            success: true,
            access_token_expires_in: state.config.jwt.access_token_expiry_ms(),
            session_id: session.session_id,
        }),
    ))
}

/// Client IP from proxy headers: first `X-Forwarded-For` hop, then
/// `X-Real-IP`. None when the request arrived without either.
fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(client_ip) = value.split(',').next() {
                return Some(client_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            return Some(value.to_string());
        }
    }

    None
}

/// `User-Agent` header value, if present.
fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
