//! Errors that abort a simulation run before it can produce a verdict.

use thiserror::Error;
use tripviz_core::ConfigError;

#[derive(Debug, Error)]
pub enum SimError {
    /// Building the runtime or writing an export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A synthetic dataset or report could not be serialized
    #[error("JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The viewer rejected its configuration
    #[error("invalid viewer configuration: {0}")]
    Config(#[from] ConfigError),
}
