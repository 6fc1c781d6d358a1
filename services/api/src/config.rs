//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    /// Simulated network latency applied to every upload and download.
    pub transfer_delay: Duration,
    /// Largest file the submit form accepts.
    pub max_upload_bytes: usize,
    /// How long a toast stays visible.
    pub toast_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: "sqlite://portal.db?mode=rwc".to_string(),
            log_level: Level::INFO,
            cors_origin: "http://localhost:5173".to_string(),
            transfer_delay: Duration::from_millis(500),
            max_upload_bytes: 10 * 1024 * 1024,
            toast_ttl: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Load Server and Database Settings ---
        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            Err(_) => defaults.bind_address,
        };

        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        if database_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Load Portal Behaviour Settings ---
        let transfer_delay = Duration::from_millis(parse_number(
            "TRANSFER_DELAY_MS",
            defaults.transfer_delay.as_millis() as u64,
        )?);
        let max_upload_bytes = parse_number("MAX_UPLOAD_BYTES", defaults.max_upload_bytes as u64)?
            as usize;
        let toast_ttl =
            Duration::from_secs(parse_number("TOAST_TTL_SECS", defaults.toast_ttl.as_secs())?);

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            transfer_delay,
            max_upload_bytes,
            toast_ttl,
        })
    }
}

fn parse_number(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(var.to_string(), format!("'{}' is not a number", raw))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_values_are_rejected() {
        std::env::set_var("PORTAL_TEST_NUMBER", "ten");
        let err = parse_number("PORTAL_TEST_NUMBER", 1).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "PORTAL_TEST_NUMBER"));
        std::env::remove_var("PORTAL_TEST_NUMBER");
    }

    #[test]
    fn unset_values_fall_back_to_defaults() {
        assert_eq!(parse_number("PORTAL_TEST_UNSET_NUMBER", 42).unwrap(), 42);
    }
}
