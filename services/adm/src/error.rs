//! services/adm/src/error.rs
//!
//! Defines the primary error type for the `adm` service.

use crate::config::ConfigError;

/// The primary error type for the `adm` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a template that failed to compile or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Represents an error building an outbound HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
