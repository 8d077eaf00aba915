pub mod auth;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree (mounted at the server root).
///
/// Route hierarchy:
///
/// ```text
/// /auth/login              login (public)
/// /auth/refresh            refresh via cookie (public)
/// /auth/refresh-token      refresh via body (public)
/// /auth/logout             logout (idempotent, public)
/// /auth/logout-all         revoke every session (requires auth)
/// /auth/me                 current user profile (requires auth)
/// /auth/validate           access token liveness (requires token)
/// /auth/should-refresh     refresh hint (requires token)
/// /auth/cleanup-sessions   delete expired/revoked sessions (admin only)
///
/// /user/signup             registration (public)
/// /user/profile            own profile (requires auth)
/// /user/all                list users (admin only)
/// /user/active             list active users (admin only)
/// /user/role/{role}        list users by role (admin only)
/// /user/username/{username} lookup (requires auth)
/// /user/{id}               lookup (requires auth)
/// /user/admin/{id}         update, deactivate (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", user::router())
}
