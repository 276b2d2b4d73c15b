use crate::error::{AppError, ConfigError};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token issuance settings. The signing secret is loaded once at startup and
/// shared read-only with every verification.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,  // seconds (900 = 15 minutes)
    pub refresh_token_expiry: i64, // seconds (2592000 = 30 days)
    pub issuer: String,
}

// A shorter secret makes HS256 brute-forceable offline.
const MIN_SECRET_LENGTH: usize = 32;

impl JwtSettings {
    /// Reject configurations that would silently weaken every token. Run once
    /// at startup; a bad value should stop the process, not surface later as
    /// unverifiable tokens.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Config(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            ))));
        }
        if self.issuer.is_empty() {
            return Err(AppError::Config(ConfigError::MissingRequired(
                "jwt.issuer".to_string(),
            )));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(AppError::Config(ConfigError::InvalidValue(
                "token expiries must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?
        .try_deserialize::<Settings>()
}
