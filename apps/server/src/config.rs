//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

/// Fallback signing key used when `SESSION_SECRET` is unset.
///
/// Startup logs a warning when this value is in effect; production
/// deployments MUST set `SESSION_SECRET`.
pub const DEV_SESSION_SECRET: &str = "gestio-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Stock level below which a product counts as low stock
    pub stock_threshold: i64,

    /// HS256 signing key for session tokens
    pub session_secret: String,

    /// Session lifetime in seconds
    pub session_ttl_secs: i64,

    /// Inline JSON credential array; takes precedence over `users_file`
    pub users_json: Option<String>,

    /// Path to a JSON credential file
    pub users_file: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./gestio.db".to_string()),

            stock_threshold: env::var("STOCK_THRESHOLD")
                .unwrap_or_else(|_| gestio_core::DEFAULT_STOCK_THRESHOLD.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCK_THRESHOLD".to_string()))?,

            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| DEV_SESSION_SECRET.to_string()),

            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_TTL_SECS".to_string()))?,

            users_json: env::var("USERS_JSON").ok(),

            users_file: env::var("USERS_FILE").ok(),
        };

        // Validate ranges the parser cannot catch
        if config.stock_threshold < 0 {
            return Err(ConfigError::InvalidValue("STOCK_THRESHOLD".to_string()));
        }
        if config.session_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_TTL_SECS".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
