/// Credential verification and token lifecycle.
///
/// Password hashing, access-token issuance and validation, refresh-token
/// rotation, and the request-time authentication gate.

mod claims;
mod gate;
mod jwt;
mod password;
mod refresh_token;

pub use claims::Claims;
pub use gate::AuthenticatedUser;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use password::FALLBACK_HASH;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::revoke_refresh_token;
pub use refresh_token::store_refresh_token;
pub use refresh_token::validate_and_rotate;
