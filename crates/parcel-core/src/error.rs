//! Error types for the parcel tracker
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the parcel tracker
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure talking to the tracking API
    /// (DNS, connection refused, timeout, non-2xx status)
    #[error("Network error: {0}")]
    Network(String),

    /// Tracking API answered but the body was not what we expected
    #[error("Decode error: {0}")]
    Decode(String),

    /// Mail transport failure (authentication, connection, rejected message)
    #[error("Notification error: {0}")]
    Notify(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the engine recovers from this error by waiting and polling again
    ///
    /// Only tracking failures are transient. Everything else is either fatal
    /// or handled by an explicit policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Decode(_))
    }
}

/// Invalid JSON from the tracking API is a decode failure
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("Invalid tracking response: {}", err))
    }
}
