use std::io;
use thiserror::Error;

/// Custom error type for the fieldcast daemon
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("I2C error: {0}")]
    I2c(#[from] rppal::i2c::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Registry error: {0}")]
    Registry(String),
}

/// Result type alias for the fieldcast daemon
pub type Result<T> = std::result::Result<T, TelemetryError>;

impl TelemetryError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TelemetryError::Config(msg.into())
    }

    /// Create a token error
    pub fn token<S: Into<String>>(msg: S) -> Self {
        TelemetryError::Token(msg.into())
    }

    /// Create a registry error
    pub fn registry<S: Into<String>>(msg: S) -> Self {
        TelemetryError::Registry(msg.into())
    }
}
