/// Password hashing and verification.
///
/// bcrypt with the default cost (12). The hash embeds its own salt and cost,
/// so no external salt storage exists anywhere in the system.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt only reads the first 72 bytes of input
const MAX_PASSWORD_LENGTH: usize = 72;

/// A valid bcrypt hash of a throwaway value. Login verifies against this when
/// the handle is unknown so both failure paths cost one bcrypt round.
pub const FALLBACK_HASH: &str = "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Hash a password after checking the length policy.
///
/// # Errors
/// Validation error for out-of-policy lengths; internal error if the entropy
/// source fails (unrecoverable).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash. A malformed hash counts as a
/// mismatch rather than an error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    verify(password, stored_hash).unwrap_or(false)
}
