//! Error types for the TripViz environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The requested dataset does not exist at the given location
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// Reading the dataset failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The source is temporarily unavailable (injected outage, server error)
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates a not-found error.
    pub fn not_found(location: impl std::fmt::Display) -> Self {
        Self::NotFound(location.to_string())
    }
}

impl From<std::io::Error> for EnvError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            std::io::ErrorKind::TimedOut => Self::Timeout(0),
            _ => Self::Io(err.to_string()),
        }
    }
}
