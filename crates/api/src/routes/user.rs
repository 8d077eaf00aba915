//! Route definitions for the `/user` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(user::signup))
        .route("/profile", get(user::profile))
        .route("/all", get(user::list_users))
        .route("/active", get(user::list_active_users))
        .route("/role/{role}", get(user::list_users_by_role))
        .route("/username/{username}", get(user::get_user_by_username))
        .route("/{id}", get(user::get_user))
        .route(
            "/admin/{id}",
            put(user::update_user).delete(user::deactivate_user),
        )
}
