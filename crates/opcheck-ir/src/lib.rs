//! opcheck IR
//!
//! The target side of the conformance harness: a small operator set, a
//! serializable model format with versioning, and an [`InferenceSession`]
//! that executes converted models at FP32 or FP16.
//!
//! ```rust
//! use opcheck_ir::{OperatorRegistry, Precision};
//!
//! let registry = OperatorRegistry::new();
//! assert!(registry.is_supported("Pad"));
//! assert_eq!("fp16".parse::<Precision>()?, Precision::FP16);
//! # Ok::<(), opcheck_ir::IrError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod model;
pub mod ops;
pub mod session;

pub use error::{IrError, Result};
pub use loader::{ModelLoader, ModelSerializer};
pub use model::{check_ir_version, IrModel, ValueInfo, IR_VERSION, MIN_IR_VERSION, OPSET};
pub use ops::{IrOperator, IrPadMode, OperatorRegistry};
pub use session::{InferenceSession, Precision, SessionOptions, TargetDevice};
