//! Cookie-based authentication extractor for Axum handlers.
//!
//! The extractor is the per-request authentication gate: routes that
//! require an identity declare it as a parameter, public routes (login,
//! refresh, signup, health) simply do not. Missing, malformed, and expired
//! credentials are indistinguishable to the caller -- all reject with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use dentapp_core::error::CoreError;
use dentapp_core::roles::UserRole;
use dentapp_core::types::DbId;

use crate::auth::cookies::ACCESS_TOKEN_COOKIE;
use crate::auth::jwt::validate_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity derived from the `accessToken` cookie.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::debug!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// The identity lives only for the request that extracted it; nothing is
/// persisted or stored ambiently.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from the `userId` claim).
    pub user_id: DbId,
    /// The username (from the `sub` claim).
    pub username: String,
    /// The user's role.
    pub role: UserRole,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Access token not found".into()))
            })?;

        let claims = validate_access_token(&token, &state.config.jwt).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let role = claims.role.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
        })
    }
}
