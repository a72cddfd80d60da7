//! Common error types for webob components.

use std::fmt;

/// A specialized Result type for webob operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for webob operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration failed validation (empty URL, zero tick).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration source could not be read or parsed.
    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// The HTTP request did not produce a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local I/O failed, e.g. opening the log file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new invalid configuration error.
    pub fn invalid_config(msg: impl fmt::Display) -> Self {
        Error::InvalidConfig(msg.to_string())
    }

    /// Create a new configuration unavailable error.
    pub fn config_unavailable(msg: impl fmt::Display) -> Self {
        Error::ConfigUnavailable(msg.to_string())
    }

    /// Create a new transport error.
    pub fn transport(msg: impl fmt::Display) -> Self {
        Error::Transport(msg.to_string())
    }
}
