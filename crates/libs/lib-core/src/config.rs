//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! There is no global instance: the server loads a [`Config`] once, validates it and
//! hands the values it needs to the components it builds (the token service gets the
//! secret and lifetime, the pool gets the database URL).
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::from_env().and_then(|c| c.validate().map(|_| c))?;
//! println!("database: {}", config.database_url);
//! # Ok::<(), lib_core::AppError>(())
//! ```

use chrono::Duration;
use lib_utils::{get_env, get_env_or, get_env_parse_or};

use crate::error::{AppError, Result};

/// Shortest accepted signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime (30 days).
pub const MAX_JWT_EXPIRATION_MINUTES: i64 = 30 * 24 * 60;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long.**
    pub jwt_secret: String,

    /// JWT token validity period in minutes
    ///
    /// After this period, users must log in again.
    /// Valid range: 1-43200 minutes (1 minute to 30 days)
    pub jwt_expiration_minutes: i64,

    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"***REDACTED***")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("bind_address", &self.bind_address)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/authgate.db");

        let jwt_secret = get_env("JWT_SECRET").map_err(|e| AppError::Config(e.to_string()))?;

        let jwt_expiration_minutes = get_env_parse_or("JWT_EXPIRATION_MINUTES", 60)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let bind_address = get_env_or("BIND_ADDRESS", "127.0.0.1:8000");

        let allowed_origins = parse_origins(&get_env_or("ALLOWED_ORIGINS", "http://localhost:3000"));

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_minutes,
            bind_address,
            allowed_origins,
        })
    }

    /// Validate configuration values against security rules.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            )));
        }

        if self.jwt_expiration_minutes < 1 || self.jwt_expiration_minutes > MAX_JWT_EXPIRATION_MINUTES {
            return Err(AppError::Config(format!(
                "JWT_EXPIRATION_MINUTES must be between 1 and {} (30 days)",
                MAX_JWT_EXPIRATION_MINUTES
            )));
        }

        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(AppError::Config(format!(
                "BIND_ADDRESS is not a valid socket address: {}",
                self.bind_address
            )));
        }

        Ok(())
    }

    /// Token lifetime as a duration.
    pub fn token_lifetime(&self) -> Duration {
        Duration::minutes(self.jwt_expiration_minutes)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
