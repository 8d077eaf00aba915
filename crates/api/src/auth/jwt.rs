//! JWT token codec: minting and verification of access and refresh tokens.
//!
//! Both token kinds are HS512-signed JWTs sharing one [`Claims`] layout.
//! [`decode_claims`] checks signature and structure only; expiry and
//! token-type are separate, explicit checks that callers compose to get a
//! "valid for this purpose" answer. Refresh tokens additionally require an
//! active session row, which is the orchestrator's job, not the codec's.

use chrono::Utc;
use dentapp_core::roles::UserRole;
use dentapp_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Remaining lifetime below which clients are advised to refresh (2 minutes).
const REFRESH_HINT_THRESHOLD_MS: i64 = 120_000;

/// Default access token expiry in seconds (15 minutes).
const DEFAULT_ACCESS_EXPIRY_SECS: i64 = 900;
/// Default refresh token expiry in seconds (7 days).
const DEFAULT_REFRESH_EXPIRY_SECS: i64 = 604_800;

/// Discriminates access from refresh tokens inside the claims.
///
/// A token whose signature verifies but whose type does not match the
/// intended use must be treated as invalid for that use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims embedded in every token.
///
/// `role` is carried by access tokens only; `session_id` by refresh tokens
/// only. Claim names match the wire format consumed by existing clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the username.
    pub sub: String,
    /// Role, present on access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// The user's internal database id.
    #[serde(rename = "userId")]
    pub user_id: DbId,
    /// Owning session, present on refresh tokens.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Access vs. refresh.
    #[serde(rename = "tokenType")]
    pub token_type: TokenType,
    /// Issued-at time (UTC Unix timestamp, seconds).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp, seconds).
    pub exp: i64,
}

/// Why a token failed signature/structure verification.
///
/// Expiry is deliberately NOT a decode failure; see [`is_expired`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed")]
    Malformed,
}

/// Configuration for token generation and validation.
///
/// Loaded once at startup and passed explicitly wherever tokens are minted
/// or verified; nothing reads the secret ambiently at call time.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA512 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in seconds (default: 900).
    pub access_token_expiry_secs: i64,
    /// Refresh token lifetime in seconds (default: 604800).
    pub refresh_token_expiry_secs: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default  |
    /// |----------------------------|----------|----------|
    /// | `JWT_SECRET`               | **yes**  | --       |
    /// | `JWT_ACCESS_EXPIRY_SECS`   | no       | `900`    |
    /// | `JWT_REFRESH_EXPIRY_SECS`  | no       | `604800` |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_secs: i64 = std::env::var("JWT_ACCESS_EXPIRY_SECS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_SECS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_SECS must be a valid i64");

        let refresh_token_expiry_secs: i64 = std::env::var("JWT_REFRESH_EXPIRY_SECS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_SECS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_SECS must be a valid i64");

        Self {
            secret,
            access_token_expiry_secs,
            refresh_token_expiry_secs,
        }
    }

    /// Access token lifetime in milliseconds, as reported to clients.
    pub fn access_token_expiry_ms(&self) -> i64 {
        self.access_token_expiry_secs * 1000
    }

    /// Refresh token lifetime in milliseconds, as reported to clients.
    pub fn refresh_token_expiry_ms(&self) -> i64 {
        self.refresh_token_expiry_secs * 1000
    }
}

/// Generate an HS512 access token for the given user.
pub fn generate_access_token(
    username: &str,
    role: UserRole,
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: username.to_string(),
        role: Some(role),
        user_id,
        session_id: None,
        token_type: TokenType::Access,
        iat: now,
        exp: now + config.access_token_expiry_secs,
    };
    sign(&claims, config)
}

/// Generate an HS512 refresh token bound to the given session.
pub fn generate_refresh_token(
    username: &str,
    user_id: DbId,
    session_id: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: username.to_string(),
        role: None,
        user_id,
        session_id: Some(session_id.to_string()),
        token_type: TokenType::Refresh,
        iat: now,
        exp: now + config.refresh_token_expiry_secs,
    };
    sign(&claims, config)
}

fn sign(claims: &Claims, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS512),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and structure, returning the embedded [`Claims`].
///
/// Does NOT check expiry or token type; callers apply [`is_expired`] and a
/// `token_type` comparison explicitly for the use at hand.
pub fn decode_claims(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.validate_exp = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })
}

/// Whether the token's embedded expiry has passed.
pub fn is_expired(claims: &Claims) -> bool {
    claims.exp <= Utc::now().timestamp()
}

/// Milliseconds until the token expires (negative once past expiry).
pub fn time_until_expiration_ms(claims: &Claims) -> i64 {
    claims.exp * 1000 - Utc::now().timestamp_millis()
}

/// Client-side refresh hint: true when less than 2 minutes of lifetime
/// remain. Advisory only, never enforced server-side.
pub fn should_refresh(claims: &Claims) -> bool {
    time_until_expiration_ms(claims) < REFRESH_HINT_THRESHOLD_MS
}

/// Full access-token check: signature, `tokenType == ACCESS`, unexpired,
/// non-empty subject. Returns the claims when all checks pass.
pub fn validate_access_token(token: &str, config: &JwtConfig) -> Option<Claims> {
    let claims = decode_claims(token, config).ok()?;
    if claims.token_type != TokenType::Access || is_expired(&claims) || claims.sub.is_empty() {
        return None;
    }
    Some(claims)
}

/// Full refresh-token check: signature, `tokenType == REFRESH`, unexpired,
/// non-empty subject. The session row backing the token is NOT consulted
/// here; that lookup belongs to the refresh flow.
pub fn validate_refresh_token(token: &str, config: &JwtConfig) -> Option<Claims> {
    let claims = decode_claims(token, config).ok()?;
    if claims.token_type != TokenType::Refresh || is_expired(&claims) || claims.sub.is_empty() {
        return None;
    }
    Some(claims)
}
