//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("WebSocket path must start with '/'")]
    InvalidPath,

    #[error("Allowed origin must not contain surrounding whitespace")]
    InvalidAllowedOrigin,

    #[error("{0} must be greater than zero")]
    ZeroSize(&'static str),

    #[error("{0} exceeds the 16 MiB ceiling")]
    SizeTooLarge(&'static str),

    #[error("Idle timeout must be greater than zero when set")]
    InvalidIdleTimeout,

    #[error("Connection limit must be greater than zero when set")]
    InvalidConnectionLimit,

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Client URL must use ws:// or wss://: {0}")]
    InvalidClientUrl(String),
}
