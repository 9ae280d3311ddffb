use crate::error::AppError;
use bcrypt::{hash, verify};

/// Fixed bcrypt cost factor. Matches what the stored hashes were produced with.
const BCRYPT_COST: u32 = 10;

/// Hashes a plaintext password with a fresh salt.
///
/// The returned string is self-contained (salt embedded), so two calls with the
/// same input produce different hashes that both verify.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a plaintext candidate against a stored bcrypt hash.
///
/// An empty candidate or empty stored hash is a mismatch, not an error: login
/// code treats every outcome here as "valid or not", and a malformed stored
/// hash must not become a 500 that distinguishes one account from another.
pub fn verify_password(candidate: &str, hashed_password: &str) -> bool {
    if candidate.is_empty() || hashed_password.is_empty() {
        return false;
    }
    verify(candidate, hashed_password).unwrap_or(false)
}
