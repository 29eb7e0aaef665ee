//! Error types for case authoring, execution and artifacts.

use opcheck_core::CoreError;
use opcheck_frontend::FrontendError;
use opcheck_ir::IrError;
use thiserror::Error;

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors raised by the harness itself or bubbled up from lower layers.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// A case was authored with impossible parameters.
    #[error("Invalid case {case_id}: {reason}")]
    InvalidCase {
        /// Stable id of the case.
        case_id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Requested hub model does not exist.
    #[error("Unknown hub model '{name}' (known: {known})")]
    UnknownModel {
        /// Requested name.
        name: String,
        /// Comma-separated known names.
        known: String,
    },

    /// No suite with this name.
    #[error("Unknown suite '{0}'")]
    UnknownSuite(String),

    /// A configuration value could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An artifact directory is missing files or inconsistent.
    #[error("Invalid artifact: {0}")]
    Artifact(String),

    /// Typed error from the core layer.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Error from the IR layer.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Error from tracing, eager execution or conversion.
    #[error("Frontend error: {0}")]
    Frontend(#[from] FrontendError),

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

impl HarnessError {
    pub(crate) fn invalid_case(case_id: &str, reason: impl Into<String>) -> Self {
        HarnessError::InvalidCase {
            case_id: case_id.to_string(),
            reason: reason.into(),
        }
    }
}
