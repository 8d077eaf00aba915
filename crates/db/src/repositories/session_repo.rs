//! Repository for the `user_sessions` table.

use dentapp_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "session_id, user_id, refresh_token, ip_address, user_agent, \
                        created_at, last_accessed, expires_at, is_active";

/// Provides CRUD operations for user sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new active session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (session_id, user_id, refresh_token, ip_address, user_agent, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(&input.session_id)
            .bind(input.user_id)
            .bind(&input.refresh_token)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an active session by its ID.
    pub async fn find_active_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE session_id = $1 AND is_active = true"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active session by its exact refresh token.
    ///
    /// Filters on `is_active` only: the refresh path must still see an
    /// expired-but-active row so it can deactivate it (the session's own
    /// expiry is checked by the caller and is authoritative).
    pub async fn find_active_by_refresh_token(
        pool: &PgPool,
        refresh_token: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token = $1 AND is_active = true"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(refresh_token)
            .fetch_optional(pool)
            .await
    }

    /// List a user's active sessions, newest first.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE user_id = $1 AND is_active = true
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count a user's active sessions.
    pub async fn count_active_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// Record a successful refresh by bumping `last_accessed` to now.
    ///
    /// Last-writer-wins under concurrent refreshes; nothing depends on
    /// read-modify-write atomicity here.
    pub async fn touch(pool: &PgPool, session_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE user_sessions SET last_accessed = NOW() WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Revoke a single session. Returns `true` if a row flipped to inactive.
    ///
    /// Revoking an already-inactive session is a no-op success.
    pub async fn revoke(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = false
             WHERE session_id = $1 AND is_active = true",
        )
        .bind(session_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all active sessions for a user. Returns the count revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = false
             WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that are expired or revoked, as of `now`.
    ///
    /// Returns the count of deleted rows. Row-scoped deletion; concurrent
    /// logins and refreshes are not blocked.
    pub async fn cleanup_expired_and_inactive(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE expires_at < $1 OR is_active = false")
                .bind(now)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
