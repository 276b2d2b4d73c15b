/// Access-token issuance and validation.
///
/// Tokens are HS256-signed with the single process-wide secret; validation
/// pins both the algorithm and the issuer, so an attacker cannot downgrade the
/// signing scheme or replay tokens from a sibling deployment.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Mint a short-lived access token for a principal.
///
/// # Errors
/// Only fails if serialization or signing fails, which is unrecoverable.
pub fn generate_access_token(user_id: &Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::new(*user_id, config.access_token_expiry, config.issuer.clone());

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and extract its claims.
///
/// Failure kinds stay distinct internally (algorithm mismatch, bad signature,
/// expiry, garbage) but all surface to the caller as the same 401.
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let kind = match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::AlgorithmMismatch
            }
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::MalformedToken,
        };
        tracing::warn!(error = %e, rejection = %kind, "Access token rejected");
        AppError::Auth(kind)
    })
}
