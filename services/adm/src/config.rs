//! services/adm/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Longest accepted `SESSION_TTL_DAYS`.
pub const MAX_SESSION_TTL_DAYS: u64 = 365;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for the OAuth2 identity provider.
#[derive(Clone, Debug)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
    pub redirect_url: String,
}

/// Settings for the S3-compatible bucket that holds the recordings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub recordings_root: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub oauth: OAuthConfig,
    pub storage: StorageConfig,
    pub session_ttl: Duration,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = or_default("BIND_ADDRESS", "0.0.0.0:8000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- OAuth Provider Settings ---
        let oauth = OAuthConfig {
            client_id: required("OAUTH_CLIENT_ID")?,
            client_secret: required("OAUTH_CLIENT_SECRET")?,
            auth_url: required("REBBLE_AUTH_URL")?,
            token_url: required("REBBLE_TOKEN_URL")?,
            user_info_url: required("REBBLE_USER_INFO_URL")?,
            redirect_url: required("OAUTH_CALLBACK_URL")?,
        };

        // --- Object Storage Settings ---
        let storage = StorageConfig {
            bucket: or_default("STORAGE_BUCKET", "rebble-audio-debug"),
            endpoint: lookup("STORAGE_ENDPOINT"),
            region: or_default("STORAGE_REGION", "auto"),
            access_key_id: lookup("STORAGE_ACCESS_KEY_ID"),
            secret_access_key: lookup("STORAGE_SECRET_ACCESS_KEY"),
            recordings_root: or_default("RECORDINGS_ROOT", "audio"),
        };

        // --- Session and Timeout Settings ---
        let session_ttl_days =
            parse_number(&or_default("SESSION_TTL_DAYS", "30"), "SESSION_TTL_DAYS")?;
        if session_ttl_days == 0 || session_ttl_days > MAX_SESSION_TTL_DAYS {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                format!("must be between 1 and {}", MAX_SESSION_TTL_DAYS),
            ));
        }
        let session_ttl_secs = session_ttl_days.checked_mul(24 * 60 * 60).ok_or_else(|| {
            ConfigError::InvalidValue("SESSION_TTL_DAYS".to_string(), "too large".to_string())
        })?;
        let http_timeout_secs =
            parse_number(&or_default("HTTP_TIMEOUT_SECS", "10"), "HTTP_TIMEOUT_SECS")?;

        Ok(Self {
            bind_address,
            log_level,
            oauth,
            storage,
            session_ttl: Duration::from_secs(session_ttl_secs),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn parse_number(value: &str, key: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
