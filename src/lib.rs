//! # opcheck
//!
//! Operator-conversion conformance checks. A single-operator module is run
//! eagerly as the reference, traced into a framework graph, converted into
//! the IR and executed by an [`InferenceSession`](opcheck_ir::InferenceSession); the
//! two results are compared within a per-precision tolerance.
//!
//! The workspace is split into:
//!
//! - [`opcheck_core`]: tensors, data types, graphs and reference tensor operations
//! - [`opcheck_ir`]: the IR operator set, model format and inference session
//! - [`opcheck_frontend`]: eager kernels, modules, the tracer and the converter
//! - [`opcheck_harness`]: case tables, the driver, artifacts and the hub check
//!
//! ```rust,no_run
//! use opcheck::prelude::*;
//!
//! let driver = Driver::new(HarnessConfig::from_env()?);
//! let selection = CaseSelection {
//!     tier: Some(Tier::Precommit),
//!     ..CaseSelection::default()
//! };
//! for report in run_selection(&driver, &selection)? {
//!     println!("{}: {}/{}", report.suite, report.pass_count, report.case_count);
//! }
//! # Ok::<(), HarnessError>(())
//! ```

pub use opcheck_core;
pub use opcheck_frontend;
pub use opcheck_harness;
pub use opcheck_ir;

/// Common imports.
pub mod prelude {
    pub use opcheck_core::{DataType, PadMode, Tensor, TensorSpec};
    pub use opcheck_frontend::{trace_module, Converter, FrameworkModel, Module};
    pub use opcheck_harness::{
        run_selection, run_suite, CaseSelection, CaseStatus, Driver, HarnessConfig, HarnessError,
        SuiteReport, Tier,
    };
    pub use opcheck_ir::{InferenceSession, IrModel, Precision, SessionOptions};
}
