//! Domain error types

use thiserror::Error;

/// Error when parsing a timeout string
#[derive(Debug, Clone, Error)]
#[error("Invalid timeout format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct TimeoutParseError {
    pub input: String,
}

/// Error when an artifact declares a media type that cannot be extracted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported media type: \"{media_type}\". Supported: text/plain, application/pdf, image/png, image/jpeg, image/gif, image/webp")]
pub struct UnsupportedMediaType {
    pub media_type: String,
}

/// Error when a named option (policy, reader, store) has an unknown value
#[derive(Debug, Clone, Error)]
#[error("Invalid {option}: \"{input}\". Valid values are: {valid}")]
pub struct InvalidOptionError {
    pub option: &'static str,
    pub input: String,
    pub valid: &'static str,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
