//! opcheck harness
//!
//! Conformance cases for framework-to-IR conversion: static case tables, an
//! input provisioner, the execution and comparison driver, a suite runner,
//! the `fill_any_like` artifact generator and the hub-model check.
//!
//! ```rust,no_run
//! use opcheck_harness::{run_suite, Driver, HarnessConfig};
//!
//! let driver = Driver::new(HarnessConfig::from_env()?);
//! let report = run_suite(&driver, "pad4d")?;
//! assert!(report.all_passed(), "{:?}", report.failures);
//! # Ok::<(), opcheck_harness::HarnessError>(())
//! ```

#![warn(missing_docs)]

pub mod artifact;
pub mod cases;
pub mod compare;
pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod hub;
pub mod provision;
pub mod report;

pub use artifact::{load_artifact, replay_artifact, save_artifact, Artifact, Manifest};
pub use cases::{
    all_cases, select_cases, suite_cases, CaseParams, CaseSelection, TestCase, Tier, SUITES,
};
pub use compare::{compare_outputs, Mismatch};
pub use config::{HarnessConfig, Tolerance};
pub use driver::{run_cases, CaseResult, CaseStatus, Driver};
pub use error::{HarnessError, Result};
pub use generator::generate_fill_any_like;
pub use hub::{run_hub_check, HubModel, InputSignature, ModelHub, OutputStructure};
pub use provision::{InputProvisioner, InputSpec, ProvisionConfig};
pub use report::{run_selection, run_suite, summarize, SuiteReport};
