//! Password hashing and dual-format verification.
//!
//! New hashes always use Argon2id with a cryptographically random salt in
//! PHC string format. Verification additionally accepts the pre-migration
//! legacy format, an unsalted Base64-encoded SHA-256 digest, selected by
//! inspecting the stored hash's prefix. The legacy path is read-only
//! deprecation debt: nothing ever writes it.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// PHC prefix shared by all Argon2 variants.
const ARGON2_PREFIX: &str = "$argon2";

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt,
/// and hash).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash of either format.
///
/// An `$argon2*` prefix selects PHC verification; anything else is compared
/// against the legacy unsalted Base64(SHA-256) digest. Unsupported or
/// corrupted hashes verify as `false` -- never an error, never a guess.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.starts_with(ARGON2_PREFIX) {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        return Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
    }

    legacy_digest(password) == stored_hash
}

/// The legacy digest: Base64 of a single unsalted SHA-256 pass.
fn legacy_digest(password: &str) -> String {
    BASE64.encode(Sha256::digest(password.as_bytes()))
}

/// Validate that a password meets minimum strength requirements.
///
/// Returns `Ok(())` when the password is acceptable, or `Err` with a
/// human-readable explanation.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.len() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}
