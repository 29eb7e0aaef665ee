//! Error types for the framework side and the converter.

use opcheck_core::CoreError;
use opcheck_ir::IrError;
use thiserror::Error;

/// Result type for framework-side operations.
pub type Result<T> = std::result::Result<T, FrontendError>;

/// Errors raised while running, tracing or converting framework models.
#[derive(Error, Debug)]
pub enum FrontendError {
    /// No eager kernel or translator exists for this operator tag.
    #[error("Unsupported operator: {op_tag}")]
    UnsupportedOperator {
        /// Framework operator tag.
        op_tag: String,
    },

    /// An attribute is missing or has the wrong type.
    #[error("Invalid attribute '{name}': {reason}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Graph capture failed.
    #[error("Trace error: {0}")]
    Trace(String),

    /// A traced operator could not be lowered to the IR.
    #[error("Cannot convert {op_tag}: {reason}")]
    Conversion {
        /// Framework operator tag.
        op_tag: String,
        /// Why the lowering failed.
        reason: String,
    },

    /// The framework model is structurally invalid.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Typed error from the core layer.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Error from the IR layer.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

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

impl FrontendError {
    pub(crate) fn conversion(op_tag: &str, reason: impl Into<String>) -> Self {
        FrontendError::Conversion {
            op_tag: op_tag.to_string(),
            reason: reason.into(),
        }
    }
}
