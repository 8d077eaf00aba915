//! Clinic staff roles.
//!
//! Roles are a closed set: every authorization site matches exhaustively so
//! that adding a variant forces a review of each gate. The database stores
//! the uppercase name in a TEXT column, and the same spelling appears in
//! JWT claims and API payloads.

use serde::{Deserialize, Serialize};

/// Staff role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Staff,
    Faculty,
    Clinician,
    Superadmin,
}

impl UserRole {
    /// The uppercase wire/storage spelling of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Staff => "STAFF",
            UserRole::Faculty => "FACULTY",
            UserRole::Clinician => "CLINICIAN",
            UserRole::Superadmin => "SUPERADMIN",
        }
    }

    /// Whether this role may use administrative endpoints.
    pub fn is_admin(self) -> bool {
        match self {
            UserRole::Admin | UserRole::Superadmin => true,
            UserRole::Staff | UserRole::Faculty | UserRole::Clinician => false,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "STAFF" => Ok(UserRole::Staff),
            "FACULTY" => Ok(UserRole::Faculty),
            "CLINICIAN" => Ok(UserRole::Clinician),
            "SUPERADMIN" => Ok(UserRole::Superadmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
