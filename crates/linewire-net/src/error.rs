//! Error types for the networking module.

use std::path::PathBuf;

use crate::tcp::WorkerState;

/// Network-specific errors.
///
/// `Connect` and `Stream` are the two runtime failure kinds of a connection
/// attempt. The worker never returns them to the caller; it converts them into
/// the free-text reason of a single `on_disconnected` notification. The other
/// variants are returned directly from API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    /// The endpoint could not be reached (refused, timeout, resolution failure, unreachable).
    #[error("Failed to connect to {endpoint}: {message}")]
    Connect {
        /// The `host:port` that was dialed.
        endpoint: String,
        /// Description of the underlying failure.
        message: String,
    },

    /// Reading from an established connection failed.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Host or port outside the accepted range.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The worker was asked to start while not idle.
    #[error("Connection worker is {0}, expected Idle")]
    NotIdle(WorkerState),

    /// The dedicated worker thread could not be spawned.
    #[error("Failed to spawn connection thread: {0}")]
    Spawn(String),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {message}")]
    ConfigFile {
        /// Path of the configuration file.
        path: PathBuf,
        /// Description of the underlying I/O failure.
        message: String,
    },
}

impl NetworkError {
    /// Create a connect failure for `endpoint`.
    pub fn connect(endpoint: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Connect {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::InvalidEndpoint(message.into())
    }

    /// Returns `true` for the failures that end a connection attempt.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Stream(_))
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(err: std::io::Error) -> Self {
        Self::Stream(err.to_string())
    }
}

impl From<toml::de::Error> for NetworkError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
