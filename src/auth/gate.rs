/// Authentication gate.
///
/// `AuthenticatedUser` is an extractor: handlers that need a caller identity
/// declare it as a parameter and receive the verified principal, or the
/// request is rejected with 401 before the handler runs. Identity is always
/// the verified subject claim, never a client-supplied header.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::jwt::validate_access_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// The verified principal behind a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub claims: Claims,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let config = req
        .app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| AppError::Internal("JWT settings not registered".to_string()))?;

    let token = bearer_token(req).ok_or(AppError::Auth(AuthError::MissingToken))?;

    let claims = validate_access_token(token, config)?;
    let id = claims.user_id()?;

    tracing::debug!(user_id = %id, "Access token validated");

    Ok(AuthenticatedUser { id, claims })
}
