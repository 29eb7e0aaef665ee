//! Error types for core operations.

use thiserror::Error;

/// Result type used by tensor and graph helpers.
pub type Result<T> = anyhow::Result<T>;

/// Typed errors raised by the core layer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A dimension was zero or a shape was otherwise impossible.
    #[error("Invalid shape {shape:?}: {reason}")]
    InvalidShape {
        /// The offending shape.
        shape: Vec<usize>,
        /// Why it was rejected.
        reason: String,
    },

    /// A data type name could not be parsed or is not supported here.
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// A padding mode name could not be parsed.
    #[error("Unsupported padding mode: {0}")]
    UnsupportedPadMode(String),

    /// Padding widths are not valid for the requested mode.
    #[error("Invalid padding: {0}")]
    InvalidPadding(String),

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Graph structure is invalid.
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),
}
