//! Execution and comparison driver.
//!
//! Per case: provision inputs, build the module, run the eager reference,
//! trace, check the expected operator tag, convert, optionally serialize and
//! reload the IR, execute it and compare. Nothing outlives the case.

use crate::cases::TestCase;
use crate::compare::{compare_outputs, Mismatch};
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::provision::InputProvisioner;
use opcheck_core::Tensor;
use opcheck_frontend::{trace_module, ConvertOptions, Converter, FrameworkModel, Module};
use opcheck_ir::{InferenceSession, ModelLoader, ModelSerializer, SessionOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, info, warn};

/// Final state of a case.
#[derive(Debug, Clone)]
pub enum CaseStatus {
    /// Outputs matched within tolerance.
    Passed,
    /// Outputs were produced but did not match.
    Failed(Mismatch),
    /// Tracing, conversion or execution failed.
    Error(String),
}

impl CaseStatus {
    /// Whether the case passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, CaseStatus::Passed)
    }
}

/// Result of one case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Suite the case belongs to.
    pub suite: String,
    /// Stable case id.
    pub case_id: String,
    /// Outcome.
    pub status: CaseStatus,
    /// Wall time spent on the case.
    pub duration: Duration,
}

/// Runs cases against a fixed configuration.
pub struct Driver {
    config: HarnessConfig,
    converter: Converter,
    session_options: SessionOptions,
}

impl Driver {
    /// Create a driver for `config`.
    pub fn new(config: HarnessConfig) -> Self {
        let mut convert_options = ConvertOptions::new().with_producer("opcheck-harness");
        if let Some(version) = config.ir_version {
            convert_options = convert_options.with_ir_version(version);
        }
        let session_options = SessionOptions::new()
            .with_device(config.device)
            .with_precision(config.precision);
        Self {
            converter: Converter::new(convert_options),
            session_options,
            config,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run `case`, drawing inputs from sampling stream `stream`.
    ///
    /// Authoring errors (bad parameters, impossible shapes) are returned as
    /// `Err`; everything after provisioning is folded into the status.
    pub fn run_case(&self, case: &TestCase, stream: u64) -> Result<CaseResult> {
        let _span = debug_span!("case", suite = case.suite, id = %case.id).entered();
        let start = Instant::now();
        case.params.validate(&case.id)?;
        let specs = case.params.input_specs()?;
        let mut provisioner = InputProvisioner::with_stream(self.config.provision.clone(), stream)?;
        let inputs = provisioner.provision(&case.id, &specs)?;

        let built = case.params.build_module();
        let named: Vec<(String, Tensor)> =
            case.params.input_names().into_iter().zip(inputs).collect();
        let status = self.check_module(&case.id, built.module.as_ref(), &built.op_tag, &named);

        match &status {
            CaseStatus::Passed => debug!("PASS {}", case.id),
            CaseStatus::Failed(mismatch) => warn!("FAIL {}: {}", case.id, mismatch),
            CaseStatus::Error(err) => warn!("ERROR {}: {}", case.id, err),
        }
        Ok(CaseResult {
            suite: case.suite.to_string(),
            case_id: case.id.clone(),
            status,
            duration: start.elapsed(),
        })
    }

    /// Check one module on named inputs, folding errors into the status.
    pub fn check_module(
        &self,
        name: &str,
        module: &dyn Module,
        op_tag: &str,
        inputs: &[(String, Tensor)],
    ) -> CaseStatus {
        match self.try_check(name, module, op_tag, inputs) {
            Ok(None) => CaseStatus::Passed,
            Ok(Some(mismatch)) => CaseStatus::Failed(mismatch),
            Err(err) => CaseStatus::Error(err.to_string()),
        }
    }

    fn try_check(
        &self,
        name: &str,
        module: &dyn Module,
        op_tag: &str,
        inputs: &[(String, Tensor)],
    ) -> Result<Option<Mismatch>> {
        let tensors: Vec<Tensor> = inputs.iter().map(|(_, t)| t.clone()).collect();
        let expected = module.forward(&tensors)?;

        let traced = trace_module(module, name, inputs)?;
        if !traced.contains_op(op_tag) {
            return Ok(Some(Mismatch::MissingOperator {
                op_tag: op_tag.to_string(),
                found: traced.op_tags(),
            }));
        }

        self.try_converted(&traced, &tensors, &expected)
    }

    /// Convert an already traced model, execute it on `inputs` and compare
    /// against `expected`, folding errors into the status.
    pub fn check_traced(
        &self,
        traced: &FrameworkModel,
        inputs: &[Tensor],
        expected: &[Tensor],
    ) -> CaseStatus {
        match self.try_converted(traced, inputs, expected) {
            Ok(None) => CaseStatus::Passed,
            Ok(Some(mismatch)) => CaseStatus::Failed(mismatch),
            Err(err) => CaseStatus::Error(err.to_string()),
        }
    }

    fn try_converted(
        &self,
        traced: &FrameworkModel,
        inputs: &[Tensor],
        expected: &[Tensor],
    ) -> Result<Option<Mismatch>> {
        let mut ir = self.converter.convert(traced)?;
        if let Some(version) = self.config.ir_version {
            let bytes = ModelSerializer::to_bytes(&ir, version)?;
            debug!(
                "Round-tripping {} through {} bytes of IR v{}",
                traced.name,
                bytes.len(),
                version
            );
            ir = ModelLoader::load_from_bytes(&bytes)?;
        }

        let session = InferenceSession::new(Arc::new(ir), self.session_options.clone())?;
        let actual = session.run_ordered(inputs)?;
        compare_outputs(expected, &actual, self.config.effective_tolerance())
    }
}

/// Run `cases` in table order, in parallel when configured.
pub fn run_cases(driver: &Driver, cases: &[TestCase]) -> Result<Vec<CaseResult>> {
    use rayon::prelude::*;

    info!(
        "Running {} cases ({}, {}, parallel={})",
        cases.len(),
        driver.config.device,
        driver.config.precision,
        driver.config.parallel
    );
    if driver.config.parallel {
        cases
            .par_iter()
            .enumerate()
            .map(|(i, case)| driver.run_case(case, i as u64))
            .collect()
    } else {
        cases
            .iter()
            .enumerate()
            .map(|(i, case)| driver.run_case(case, i as u64))
            .collect()
    }
}
