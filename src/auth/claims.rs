/// Access-token claim set (RFC 7519 registered claims).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Claims carried by an access token. The subject is the principal id as an
/// opaque string; no profile data travels in the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (principal id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Parse the subject back into a principal id.
    ///
    /// # Errors
    /// A token we signed always carries a valid id, so a parse failure means
    /// the token is not ours.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::MalformedToken))
    }
}
