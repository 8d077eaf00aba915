//! User session model and DTOs.

use chrono::Utc;
use dentapp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table.
///
/// One row per device login. The row stores the refresh token verbatim so a
/// session can be revoked (and its token rejected) long before the token's
/// own cryptographic expiry.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub session_id: String,
    pub user_id: DbId,
    pub refresh_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub last_accessed: Timestamp,
    pub expires_at: Timestamp,
    pub is_active: bool,
}

impl UserSession {
    /// Whether the session's own expiry has passed.
    ///
    /// Session expiry is authoritative over the embedded token expiry; the
    /// two lifetimes are allowed to diverge.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A session is usable only while active and unexpired.
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_expired()
    }
}

/// DTO for creating a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub session_id: String,
    pub user_id: DbId,
    pub refresh_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
}
