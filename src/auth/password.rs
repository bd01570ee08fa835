//! Password hashing

use crate::error::Result;

/// bcrypt work factor for stored password hashes
pub const PASSWORD_HASH_COST: u32 = 10;

/// Longest password bcrypt hashes in full. Its 72 byte input includes a
/// trailing NUL; anything longer is refused rather than silently cut.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Hash a plaintext password with a fresh random salt.
///
/// The output is a self-describing bcrypt string (`$2b$<cost>$<salt><hash>`),
/// so two calls with the same input never produce the same value.
/// Fails for input longer than [`MAX_PASSWORD_BYTES`].
pub fn hash_password(plaintext: &str) -> Result<String> {
    Ok(bcrypt::non_truncating_hash(plaintext, PASSWORD_HASH_COST)?)
}

/// Check a plaintext password against a stored hash.
///
/// Uses the salt and cost embedded in `hash` and compares in constant time.
/// A malformed hash or an over-long password is reported as a mismatch,
/// never as an error.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    match bcrypt::non_truncating_verify(plaintext, hash) {
        Ok(matches) => matches,
        Err(bcrypt::BcryptError::Truncation(len)) => {
            tracing::debug!("Rejecting {} byte password", len);
            false
        }
        Err(e) => {
            tracing::debug!("Rejecting malformed password hash: {}", e);
            false
        }
    }
}
