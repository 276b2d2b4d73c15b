/// Authentication routes: registration, login, token refresh, current user.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    generate_access_token, generate_refresh_token, hash_password, revoke_refresh_token,
    store_refresh_token, validate_and_rotate, verify_password, AuthenticatedUser, FALLBACK_HASH,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError, ErrorContext, ValidationError};
use crate::store::CredentialStore;
use crate::validators::is_valid_email;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response for login and refresh: both tokens plus the access-token window.
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// POST /auth/register
///
/// # Errors
/// - 400: invalid email or password below the length policy
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    store: web::Data<CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    let password_hash = hash_password(&form.password)?;

    // Fast path; the unique constraint on users.email is the authority under
    // concurrent registration.
    if store.exists(&email).await? {
        return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
            "Email already registered".to_string(),
        )));
    }

    let user_id = store.insert(&email, &password_hash).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(RegisterResponse {
        id: user_id.to_string(),
        email,
    }))
}

/// POST /auth/login
///
/// # Errors
/// - 400: malformed email
/// - 401: unknown handle or wrong password, indistinguishable by status,
///   body, and timing (the unknown-handle path burns a bcrypt round against a
///   fallback hash)
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<CredentialStore>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let email = is_valid_email(&form.email)?;

    let record = match store.find_by_email(&email).await? {
        Some(record) => record,
        None => {
            let _ = verify_password(&form.password, FALLBACK_HASH);
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }
    };

    if !verify_password(&form.password, &record.password_hash) {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let access_token = generate_access_token(&record.id, jwt_config.get_ref())?;
    let refresh_token = generate_refresh_token();
    store_refresh_token(
        pool.get_ref(),
        record.id,
        &refresh_token,
        jwt_config.refresh_token_expiry,
    )
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %record.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /auth/refresh
///
/// Consumes the presented refresh token and answers with a fresh access token
/// plus the rotated refresh token. A token that was already rotated fails
/// with 401, which tells the legitimate client its token was replayed.
///
/// # Errors
/// - 400: missing refresh token
/// - 401: unknown, already-rotated, or expired refresh token
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    if form.refresh_token.is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "refresh_token".to_string(),
        )));
    }

    let (user_id, refresh_token) = validate_and_rotate(
        pool.get_ref(),
        &form.refresh_token,
        jwt_config.refresh_token_expiry,
    )
    .await?;

    let access_token = generate_access_token(&user_id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "Refresh token rotated"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /auth/logout
///
/// Revokes the presented refresh token so it can never be exchanged again.
/// Idempotent: logging out with an unknown or already-revoked token still
/// answers 204, since the end state is the same.
pub async fn logout(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_logout");

    revoke_refresh_token(pool.get_ref(), &form.refresh_token).await?;

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}

/// GET /auth/me
///
/// # Errors
/// - 401: missing, malformed, or expired access token (extractor)
/// - 404: principal no longer exists
pub async fn get_current_user(
    user: AuthenticatedUser,
    store: web::Data<CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let record = store.find_by_id(user.id).await?.ok_or_else(|| {
        AppError::Database(DatabaseError::NotFound("User not found".to_string()))
    })?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: record.id.to_string(),
        email: record.email,
        created_at: record.created_at.to_rfc3339(),
    }))
}
