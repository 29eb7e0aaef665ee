//! Error types for the IR crate.

use opcheck_core::CoreError;
use thiserror::Error;

/// Result type for IR operations.
pub type Result<T> = std::result::Result<T, IrError>;

/// Errors raised while loading, validating or executing IR models.
#[derive(Error, Debug)]
pub enum IrError {
    /// No operator is registered under this name.
    #[error("Unsupported operator: {op_type}")]
    UnsupportedOperator {
        /// Operator type name.
        op_type: String,
    },

    /// An attribute is missing or has the wrong type.
    #[error("Invalid attribute '{name}': {reason}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Graph structure or operator arity is invalid.
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// The model's IR version is outside the supported range.
    #[error("Unsupported IR version {version} (supported {min}..={max})")]
    UnsupportedIrVersion {
        /// Requested or declared version.
        version: i64,
        /// Oldest supported version.
        min: i64,
        /// Newest supported version.
        max: i64,
    },

    /// The serialized model could not be interpreted.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Session inputs do not match the model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested execution device is not available.
    #[error("Unsupported device: {0}")]
    UnsupportedDevice(String),

    /// Typed error from the core layer.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Failure inside a tensor operation.
    #[error("Tensor operation failed: {0}")]
    Tensor(#[from] anyhow::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
