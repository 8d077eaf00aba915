//! Shared response envelope for API handlers.
//!
//! Plain success/failure responses use `{ "message": ..., "success": ... }`.
//! Use [`ApiResponse`] instead of ad-hoc `serde_json::json!` so the
//! envelope stays consistent across handlers.

use serde::Serialize;

/// Standard `{ message, success }` response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub success: bool,
}

impl ApiResponse {
    /// A successful envelope with the given message.
    pub fn ok(message: impl Into<String>) -> Self {
        ApiResponse {
            message: message.into(),
            success: true,
        }
    }
}
