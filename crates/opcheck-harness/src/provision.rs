//! Input provisioning.
//!
//! Shapes are deterministic, values are sampled: floats uniformly in
//! `[low, high)`, integers uniformly in `[int_low, int_high)`, bools as a
//! fair coin. A seed makes the stream reproducible.

use crate::error::{HarnessError, Result};
use opcheck_core::{DataType, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sampling configuration threaded into every [`InputProvisioner`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    /// Element type used when an input does not declare one.
    pub default_dtype: DataType,
    /// Lower bound for floating values (inclusive).
    pub low: f64,
    /// Upper bound for floating values (exclusive).
    pub high: f64,
    /// Lower bound for integer values (inclusive).
    pub int_low: i64,
    /// Upper bound for integer values (exclusive).
    pub int_high: i64,
    /// Seed for reproducible sampling; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            default_dtype: DataType::F32,
            low: 0.0,
            high: 1.0,
            int_low: 0,
            int_high: 10,
            seed: None,
        }
    }
}

impl ProvisionConfig {
    /// Set the default element type.
    pub fn with_default_dtype(mut self, dtype: DataType) -> Self {
        self.default_dtype = dtype;
        self
    }

    /// Set the floating range `[low, high)`.
    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Set the integer range `[low, high)`.
    pub fn with_int_range(mut self, low: i64, high: i64) -> Self {
        self.int_low = low;
        self.int_high = high;
        self
    }

    /// Set or clear the seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Declared input of a case.
#[derive(Debug, Clone)]
pub enum InputSpec {
    /// Freshly sampled tensor; `dtype: None` uses the configured default.
    Random {
        /// Dimensions; every entry must be positive.
        shape: Vec<usize>,
        /// Element type.
        dtype: Option<DataType>,
    },
    /// Tensor returned verbatim.
    Fixed(Tensor),
}

impl InputSpec {
    /// Random input of `shape` with the default element type.
    pub fn random(shape: &[usize]) -> Self {
        InputSpec::Random {
            shape: shape.to_vec(),
            dtype: None,
        }
    }

    /// Random input of `shape` and `dtype`.
    pub fn random_typed(shape: &[usize], dtype: DataType) -> Self {
        InputSpec::Random {
            shape: shape.to_vec(),
            dtype: Some(dtype),
        }
    }

    /// Fixed `int32` scalar.
    pub fn int32_scalar(value: i32) -> Result<Self> {
        Ok(InputSpec::Fixed(Tensor::from_i32(vec![value], vec![])?))
    }
}

/// Produces input tensors for one case.
pub struct InputProvisioner {
    config: ProvisionConfig,
    rng: StdRng,
}

impl InputProvisioner {
    /// Provisioner seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: ProvisionConfig) -> Result<Self> {
        Self::with_stream(config, 0)
    }

    /// Provisioner for the `stream`-th case of a run. Seeded runs give each
    /// stream its own reproducible sequence.
    pub fn with_stream(config: ProvisionConfig, stream: u64) -> Result<Self> {
        if config.low.is_nan() || config.high.is_nan() || config.low >= config.high {
            return Err(HarnessError::Config(format!(
                "empty float range [{}, {})",
                config.low, config.high
            )));
        }
        if config.int_low >= config.int_high {
            return Err(HarnessError::Config(format!(
                "empty integer range [{}, {})",
                config.int_low, config.int_high
            )));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    /// Provision every input of a case.
    pub fn provision(&mut self, case_id: &str, specs: &[InputSpec]) -> Result<Vec<Tensor>> {
        specs
            .iter()
            .map(|spec| match spec {
                InputSpec::Fixed(tensor) => Ok(tensor.clone()),
                InputSpec::Random { shape, dtype } => {
                    if let Some(pos) = shape.iter().position(|&d| d == 0) {
                        return Err(HarnessError::invalid_case(
                            case_id,
                            format!("dimension {pos} of input shape {shape:?} is not positive"),
                        ));
                    }
                    let dtype = dtype.unwrap_or(self.config.default_dtype);
                    self.sample(shape, dtype)
                }
            })
            .collect()
    }

    /// Sample one tensor of `shape` and `dtype`.
    pub fn sample(&mut self, shape: &[usize], dtype: DataType) -> Result<Tensor> {
        let n: usize = shape.iter().product();
        let tensor = match dtype {
            DataType::Bool => {
                let data: Vec<bool> = (0..n).map(|_| self.rng.gen::<bool>()).collect();
                Tensor::from_bool(data, shape.to_vec())?
            }
            dtype if dtype.is_integer() => {
                let low = if dtype == DataType::U8 {
                    self.config.int_low.max(0)
                } else {
                    self.config.int_low
                };
                let high = self.config.int_high.max(low + 1);
                let data: Vec<f64> = (0..n)
                    .map(|_| self.rng.gen_range(low..high) as f64)
                    .collect();
                Tensor::from_f64(data, shape.to_vec(), dtype)?
            }
            dtype => {
                let (low, high) = (self.config.low, self.config.high);
                let data: Vec<f64> = (0..n).map(|_| self.rng.gen_range(low..high)).collect();
                Tensor::from_f64(data, shape.to_vec(), dtype)?
            }
        };
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> InputProvisioner {
        InputProvisioner::new(ProvisionConfig::default().with_seed(Some(seed))).unwrap()
    }

    #[test]
    fn test_float_range() {
        let mut provisioner = seeded(1);
        let x = provisioner.sample(&[4, 5], DataType::F32).unwrap();
        assert_eq!(x.shape(), vec![4, 5]);
        assert!(x.to_vec().unwrap().iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = seeded(42).sample(&[16], DataType::F32).unwrap();
        let b = seeded(42).sample(&[16], DataType::F32).unwrap();
        assert_eq!(a.to_vec().unwrap(), b.to_vec().unwrap());
    }

    #[test]
    fn test_streams_differ() {
        let config = ProvisionConfig::default().with_seed(Some(3));
        let a = InputProvisioner::with_stream(config.clone(), 0)
            .unwrap()
            .sample(&[16], DataType::F32)
            .unwrap();
        let b = InputProvisioner::with_stream(config, 1)
            .unwrap()
            .sample(&[16], DataType::F32)
            .unwrap();
        assert_ne!(a.to_vec().unwrap(), b.to_vec().unwrap());
    }

    #[test]
    fn test_integer_and_bool_sampling() {
        let mut provisioner = seeded(5);
        let ints = provisioner.sample(&[32], DataType::I32).unwrap();
        assert_eq!(ints.dtype(), DataType::I32);
        assert!(ints.to_vec_i64().unwrap().iter().all(|&v| (0..10).contains(&v)));

        let flags = provisioner.sample(&[32], DataType::Bool).unwrap();
        assert_eq!(flags.dtype(), DataType::Bool);
        assert!(flags.to_vec_i64().unwrap().iter().all(|&v| v == 0 || v == 1));
    }

    #[test]
    fn test_zero_dimension_fails_fast() {
        let mut provisioner = seeded(0);
        let err = provisioner
            .provision("bad", &[InputSpec::random(&[1, 0, 3])])
            .unwrap_err();
        assert!(matches!(err, HarnessError::InvalidCase { .. }));
    }

    #[test]
    fn test_fixed_inputs_verbatim() {
        let mut provisioner = seeded(0);
        let inputs = provisioner
            .provision("fixed", &[InputSpec::int32_scalar(5).unwrap()])
            .unwrap();
        assert_eq!(inputs[0].dtype(), DataType::I32);
        assert_eq!(inputs[0].scalar_i64().unwrap(), 5);
    }

    #[test]
    fn test_default_dtype_is_configurable() {
        let config = ProvisionConfig::default()
            .with_default_dtype(DataType::F64)
            .with_seed(Some(9));
        let mut provisioner = InputProvisioner::new(config).unwrap();
        let inputs = provisioner.provision("f64", &[InputSpec::random(&[2])]).unwrap();
        assert_eq!(inputs[0].dtype(), DataType::F64);
    }

    #[test]
    fn test_empty_range_rejected() {
        let config = ProvisionConfig::default().with_range(1.0, 1.0);
        assert!(InputProvisioner::new(config).is_err());
    }
}
