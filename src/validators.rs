/// Handle (email) validation.
///
/// Registration and login handles go through the same screening: length
/// limits, RFC 5322-style format, and a screen for hostile input before it
/// reaches the store layer.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

// RFC 5321 bounds: 254 octets total, 64 for the local part.
const MAX_EMAIL_LENGTH: usize = 254;
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Queries are parameterized everywhere; this screen exists to reject and
    // log hostile input early.
    static ref SQL_INJECTION_PATTERNS: [Regex; 4] = [
        Regex::new(r"(?i)\s+UNION\s+").unwrap(),
        Regex::new(r"(--|;|/\*|\*/|xp_|sp_)").unwrap(),
        Regex::new(r"(?i);\s*(INSERT|UPDATE|DELETE|DROP|CREATE|ALTER)").unwrap(),
        Regex::new(r#"(?i)(\bOR\b|\bAND\b)\s*(['"][0-9]*['"]|[0-9]*)\s*=\s*(['"][0-9]*['"]|[0-9]*|True|False)"#).unwrap(),
    ];
}

/// Validates and normalizes an email handle. Returns the trimmed value.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let handle = email.trim();
    let field = || "email".to_string();

    match handle.len() {
        0 => return Err(ValidationError::EmptyField(field())),
        n if n < MIN_EMAIL_LENGTH => {
            return Err(ValidationError::TooShort(field(), MIN_EMAIL_LENGTH))
        }
        n if n > MAX_EMAIL_LENGTH => {
            return Err(ValidationError::TooLong(field(), MAX_EMAIL_LENGTH))
        }
        _ => {}
    }

    if !EMAIL_REGEX.is_match(handle) {
        return Err(ValidationError::InvalidFormat(field()));
    }

    if is_suspicious_handle(handle) {
        return Err(ValidationError::SuspiciousContent(field()));
    }

    if SQL_INJECTION_PATTERNS.iter().any(|p| p.is_match(handle)) {
        return Err(ValidationError::PossibleSqlInjection);
    }

    Ok(handle.to_string())
}

fn is_suspicious_handle(handle: &str) -> bool {
    let oversized_local_part = handle
        .split_once('@')
        .map(|(local, _)| local.len() > MAX_LOCAL_PART_LENGTH)
        .unwrap_or(true);

    oversized_local_part || handle.matches('@').count() != 1 || handle.contains('\0')
}
