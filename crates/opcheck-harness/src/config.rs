//! Harness configuration.
//!
//! [`HarnessConfig`] is built with `with_*` methods on top of `Default`, or
//! from `OPCHECK_*` environment variables via [`HarnessConfig::from_env`].
//! Command-line flags are applied on top of the environment.

use crate::error::{HarnessError, Result};
use crate::provision::ProvisionConfig;
use opcheck_ir::{Precision, TargetDevice, IR_VERSION, MIN_IR_VERSION};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable selecting the target device.
pub const ENV_DEVICE: &str = "OPCHECK_DEVICE";
/// Environment variable selecting the precision.
pub const ENV_PRECISION: &str = "OPCHECK_PRECISION";
/// Environment variable requesting an IR serialization round trip.
pub const ENV_IR_VERSION: &str = "OPCHECK_IR_VERSION";
/// Environment variable seeding input sampling.
pub const ENV_SEED: &str = "OPCHECK_SEED";

/// Absolute and relative tolerance for `|a - b| <= atol + rtol * |b|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Absolute tolerance.
    pub atol: f64,
    /// Relative tolerance.
    pub rtol: f64,
}

impl Tolerance {
    /// Create a tolerance pair.
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }

    /// Default tolerance for a precision.
    pub fn for_precision(precision: Precision) -> Self {
        match precision {
            Precision::FP32 => Self::new(1e-4, 1e-4),
            Precision::FP16 => Self::new(5e-2, 5e-2),
        }
    }

    /// Whether `actual` is close enough to `expected`.
    pub fn accepts(&self, actual: f64, expected: f64) -> bool {
        if actual.is_nan() || expected.is_nan() {
            return actual.is_nan() && expected.is_nan();
        }
        if actual.is_infinite() || expected.is_infinite() {
            return actual == expected;
        }
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }
}

/// Configuration shared by every case of a run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Device the converted model executes on.
    pub device: TargetDevice,
    /// Execution precision.
    pub precision: Precision,
    /// Serialize and reload the IR at this version before executing it.
    pub ir_version: Option<i64>,
    /// Overrides the per-precision default tolerance.
    pub tolerance: Option<Tolerance>,
    /// Input sampling configuration.
    pub provision: ProvisionConfig,
    /// Run cases on the rayon pool.
    pub parallel: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            device: TargetDevice::Cpu,
            precision: Precision::FP32,
            ir_version: None,
            tolerance: None,
            provision: ProvisionConfig::default(),
            parallel: true,
        }
    }
}

impl HarnessConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `OPCHECK_DEVICE`, `OPCHECK_PRECISION`, `OPCHECK_IR_VERSION` and
    /// `OPCHECK_SEED`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(device) = lookup(ENV_DEVICE) {
            config.device = device.parse()?;
        }
        if let Some(precision) = lookup(ENV_PRECISION) {
            config.precision = precision.parse()?;
        }
        if let Some(version) = lookup(ENV_IR_VERSION) {
            let version = version.trim().parse::<i64>().map_err(|_| {
                HarnessError::Config(format!("{ENV_IR_VERSION}='{version}' is not an integer"))
            })?;
            config = config.with_ir_version(version)?;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            let seed = seed.trim().parse::<u64>().map_err(|_| {
                HarnessError::Config(format!("{ENV_SEED}='{seed}' is not an unsigned integer"))
            })?;
            config.provision = config.provision.with_seed(Some(seed));
        }
        Ok(config)
    }

    /// Set the target device.
    pub fn with_device(mut self, device: TargetDevice) -> Self {
        self.device = device;
        self
    }

    /// Set the execution precision.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Request a serialization round trip at `version`.
    pub fn with_ir_version(mut self, version: i64) -> Result<Self> {
        if !(MIN_IR_VERSION..=IR_VERSION).contains(&version) {
            return Err(HarnessError::Config(format!(
                "IR version {version} outside supported range {MIN_IR_VERSION}..={IR_VERSION}"
            )));
        }
        self.ir_version = Some(version);
        Ok(self)
    }

    /// Override the comparison tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Replace the input sampling configuration.
    pub fn with_provision(mut self, provision: ProvisionConfig) -> Self {
        self.provision = provision;
        self
    }

    /// Enable or disable parallel case execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Tolerance in effect for this configuration.
    pub fn effective_tolerance(&self) -> Tolerance {
        self.tolerance
            .unwrap_or_else(|| Tolerance::for_precision(self.precision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.device, TargetDevice::Cpu);
        assert_eq!(config.precision, Precision::FP32);
        assert_eq!(config.effective_tolerance(), Tolerance::new(1e-4, 1e-4));
        assert!(config.parallel);
    }

    #[test]
    fn test_fp16_tolerance() {
        let config = HarnessConfig::new().with_precision(Precision::FP16);
        assert_eq!(config.effective_tolerance(), Tolerance::new(5e-2, 5e-2));
    }

    #[test]
    fn test_tolerance_override() {
        let config = HarnessConfig::new().with_tolerance(Tolerance::new(0.5, 0.0));
        assert_eq!(config.effective_tolerance().atol, 0.5);
    }

    #[test]
    fn test_from_lookup() {
        let config = HarnessConfig::from_lookup(lookup(&[
            (ENV_DEVICE, "cpu"),
            (ENV_PRECISION, "FP16"),
            (ENV_IR_VERSION, "10"),
            (ENV_SEED, "7"),
        ]))
        .unwrap();
        assert_eq!(config.precision, Precision::FP16);
        assert_eq!(config.ir_version, Some(10));
        assert_eq!(config.provision.seed, Some(7));
    }

    #[test]
    fn test_unknown_device_rejected() {
        let result = HarnessConfig::from_lookup(lookup(&[(ENV_DEVICE, "GPU")]));
        assert!(matches!(result, Err(HarnessError::Ir(_))));
    }

    #[test]
    fn test_bad_ir_version_rejected() {
        assert!(HarnessConfig::from_lookup(lookup(&[(ENV_IR_VERSION, "three")])).is_err());
        assert!(HarnessConfig::new().with_ir_version(3).is_err());
    }

    #[test]
    fn test_tolerance_accepts() {
        let tol = Tolerance::new(1e-4, 1e-4);
        assert!(tol.accepts(1.00005, 1.0));
        assert!(!tol.accepts(1.01, 1.0));
        assert!(tol.accepts(f64::NAN, f64::NAN));
        assert!(!tol.accepts(f64::INFINITY, 1.0));
        assert!(tol.accepts(f64::NEG_INFINITY, f64::NEG_INFINITY));
    }
}
