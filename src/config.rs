//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JUDGE_CALLBACK_URL, DEFAULT_JUDGE_TIMEOUT_SECONDS,
    DEFAULT_JUDGE_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub judge: JudgeConfig,
    pub revalidate: RevalidateConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL; when absent the service runs on a volatile in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
}

/// External judge configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL of the external judge service
    pub url: String,
    /// Callback URL handed to the judge with every dispatched submission
    pub callback_url: String,
    /// Shared secret the judge must present on webhook callbacks
    pub webhook_secret: String,
    /// Timeout for outbound judge requests in seconds
    pub timeout_seconds: u64,
}

/// Cache revalidation sink configuration
#[derive(Debug, Clone)]
pub struct RevalidateConfig {
    /// Revalidation endpoint of the render layer; notifications are skipped when absent
    pub url: Option<String>,
    /// Shared secret presented on outbound revalidation requests
    pub secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
            revalidate: RevalidateConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").ok(),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("JUDGE_URL").unwrap_or_else(|_| DEFAULT_JUDGE_URL.to_string()),
            callback_url: env::var("JUDGE_CALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_JUDGE_CALLBACK_URL.to_string()),
            webhook_secret: env::var("JUDGE_WEBHOOK_SECRET")
                .map_err(|_| ConfigError::Missing("JUDGE_WEBHOOK_SECRET".to_string()))?,
            timeout_seconds: env::var("JUDGE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| DEFAULT_JUDGE_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JUDGE_TIMEOUT_SECONDS".to_string()))?,
        })
    }
}

impl RevalidateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REVALIDATE_URL").ok(),
            secret: env::var("REVALIDATE_SECRET").unwrap_or_default(),
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // Test that defaults are applied when env vars are not set
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_judge_defaults() {
        let judge = JudgeConfig {
            url: DEFAULT_JUDGE_URL.to_string(),
            callback_url: DEFAULT_JUDGE_CALLBACK_URL.to_string(),
            webhook_secret: "secret".to_string(),
            timeout_seconds: DEFAULT_JUDGE_TIMEOUT_SECONDS,
        };
        assert!(judge.callback_url.ends_with("/submissions/callback"));
        assert_eq!(judge.timeout_seconds, 10);
    }
}
