/// Unified error handling.
///
/// Domain-specific error types are kept separate (validation, database,
/// authentication, configuration) and converge on `AppError`, which maps to
/// HTTP responses. Token failures are distinguished internally for logging but
/// every one of them surfaces to the client as the same 401 with a generic
/// message. No response ever carries a password hash, a raw refresh token, or
/// database error text.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Input validation errors. Always a 400 for the caller.
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
    PossibleSqlInjection,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
            ValidationError::PossibleSqlInjection => {
                write!(f, "input contains potentially dangerous SQL patterns")
            }
        }
    }
}

impl StdError for ValidationError {}

/// Store-layer errors. Only the duplicate and not-found classes reach the
/// client with a specific status; everything else is a generic 500.
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    QueryExecution(String),
    ConnectionPool(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::QueryExecution(msg) => write!(f, "Query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => {
                write!(f, "Database connection error: {}", msg)
            }
        }
    }
}

impl StdError for DatabaseError {}

/// Authentication and token lifecycle errors.
///
/// The variants matter server-side: an `AlgorithmMismatch` is a likely
/// downgrade attack, a `RefreshTokenNotFound` right after a rotation is a
/// replay signal. Clients see a single generic 401 for all of them.
#[derive(Debug)]
pub enum AuthError {
    /// Unified login failure; never reveals whether the handle or the
    /// password was wrong.
    InvalidCredentials,
    MissingToken,
    MalformedToken,
    AlgorithmMismatch,
    InvalidSignature,
    TokenExpired,
    RefreshTokenNotFound,
    RefreshTokenExpired,
    NotResourceOwner,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::MalformedToken => write!(f, "Malformed token"),
            AuthError::AlgorithmMismatch => write!(f, "Token signing algorithm mismatch"),
            AuthError::InvalidSignature => write!(f, "Token signature verification failed"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::RefreshTokenNotFound => write!(f, "Refresh token not found"),
            AuthError::RefreshTokenExpired => write!(f, "Refresh token has expired"),
            AuthError::NotResourceOwner => write!(f, "Not the owner of this resource"),
        }
    }
}

impl StdError for AuthError {}

#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Central error type all application errors map to.
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            sqlx::Error::Database(db_err) => {
                // 23505 = unique_violation in Postgres
                if db_err.code().as_deref() == Some("23505") {
                    AppError::Database(DatabaseError::UniqueConstraintViolation(
                        "Resource already exists".to_string(),
                    ))
                } else {
                    AppError::Database(DatabaseError::QueryExecution(db_err.to_string()))
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Database(DatabaseError::ConnectionPool(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::QueryExecution(err.to_string())),
        }
    }
}

/// JSON body returned for every error response.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Correlation id for matching client reports against server logs.
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Client-facing status, code, and message. Token failures intentionally
    /// collapse into one indistinguishable body.
    fn client_view(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Database(DatabaseError::UniqueConstraintViolation(msg)) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone())
            }
            AppError::Database(DatabaseError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "Storage error occurred".to_string(),
            ),

            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Auth(AuthError::MissingToken) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid authorization header".to_string(),
            ),
            AppError::Auth(AuthError::NotResourceOwner) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You do not own this resource".to_string(),
            ),
            AppError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".to_string(),
            ),

            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Server configuration error".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(error_id = error_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::debug!(error_id = error_id, error = %self, "Record not found");
            }
            AppError::Database(e) => {
                tracing::error!(error_id = error_id, error = %e, "Database error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication failure");
            }
            AppError::Config(e) => {
                tracing::error!(error_id = error_id, error = %e, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, message) = self.client_view();
        let body = ErrorResponse::new(error_id, message, code.to_string(), status.as_u16());
        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.client_view().0
    }
}

/// Per-operation context carried through handlers so related log lines share a
/// request id.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
        }
    }
}
