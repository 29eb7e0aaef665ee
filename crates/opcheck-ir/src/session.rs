//! Executing IR models.

use crate::error::{IrError, Result};
use crate::model::IrModel;
use crate::ops::OperatorRegistry;
use opcheck_core::{DataType, NodeId, Tensor};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Floating-point precision used for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Full precision.
    #[default]
    FP32,
    /// Half precision: float values are held as f16 between operators.
    FP16,
}

impl Precision {
    /// Canonical spelling.
    pub fn name(self) -> &'static str {
        match self {
            Precision::FP32 => "FP32",
            Precision::FP16 => "FP16",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Precision {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "FP32" | "F32" => Ok(Precision::FP32),
            "FP16" | "F16" => Ok(Precision::FP16),
            other => Err(IrError::InvalidInput(format!("unknown precision '{other}'"))),
        }
    }
}

/// Device a session executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetDevice {
    /// Host CPU.
    #[default]
    Cpu,
}

impl fmt::Display for TargetDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDevice::Cpu => f.write_str("CPU"),
        }
    }
}

impl FromStr for TargetDevice {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CPU" => Ok(TargetDevice::Cpu),
            other => Err(IrError::UnsupportedDevice(other.to_string())),
        }
    }
}

/// Options for configuring an inference session
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    device: TargetDevice,
    precision: Precision,
}

impl SessionOptions {
    /// Create new session options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution device
    pub fn with_device(mut self, device: TargetDevice) -> Self {
        self.device = device;
        self
    }

    /// Set the execution precision
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Get the execution device
    pub fn device(&self) -> TargetDevice {
        self.device
    }

    /// Get the execution precision
    pub fn precision(&self) -> Precision {
        self.precision
    }
}

/// An inference session for running an IR model
pub struct InferenceSession {
    model: Arc<IrModel>,
    order: Vec<NodeId>,
    registry: OperatorRegistry,
    initializers: HashMap<String, Tensor>,
    options: SessionOptions,
}

impl InferenceSession {
    /// Validate `model` and prepare it for execution.
    pub fn new(model: Arc<IrModel>, options: SessionOptions) -> Result<Self> {
        info!(
            "Building inference session on {} at {}",
            options.device(),
            options.precision()
        );
        let registry = OperatorRegistry::new();
        model.validate(&registry)?;
        let order = model
            .graph
            .topological_sort()
            .map_err(|e| IrError::InvalidGraph(e.to_string()))?;

        let mut initializers = HashMap::new();
        for name in model.initializers.keys() {
            let tensor = model.initializer(name)?;
            initializers.insert(name.clone(), Self::lower(&options, tensor)?);
        }

        Ok(Self {
            model,
            order,
            registry,
            initializers,
            options,
        })
    }

    /// Run with inputs keyed by name; returns outputs keyed by name.
    pub fn run(&self, inputs: HashMap<&str, Tensor>) -> Result<HashMap<String, Tensor>> {
        let ordered = self
            .model
            .inputs
            .iter()
            .map(|info| {
                inputs.get(info.name.as_str()).cloned().ok_or_else(|| {
                    IrError::InvalidInput(format!("Missing required input: {}", info.name))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if inputs.len() != ordered.len() {
            return Err(IrError::InvalidInput(format!(
                "model takes {} inputs, {} supplied",
                ordered.len(),
                inputs.len()
            )));
        }

        let outputs = self.run_ordered(&ordered)?;
        Ok(self
            .model
            .outputs
            .iter()
            .map(|info| info.name.clone())
            .zip(outputs)
            .collect())
    }

    /// Run with inputs in declaration order; returns outputs in declaration order.
    pub fn run_ordered(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        debug!("Running inference with {} inputs", inputs.len());
        self.validate_inputs(inputs)?;

        let mut values: HashMap<&str, Tensor> = HashMap::new();
        for (name, tensor) in &self.initializers {
            values.insert(name.as_str(), tensor.clone());
        }
        for (info, tensor) in self.model.inputs.iter().zip(inputs) {
            values.insert(info.name.as_str(), Self::lower(&self.options, tensor.clone())?);
        }

        for &node_id in &self.order {
            let node = self
                .model
                .graph
                .node(node_id)
                .ok_or_else(|| IrError::InvalidGraph(format!("missing node {node_id}")))?;
            debug!("Executing node: {} ({})", node.id, node.op_type);

            let input_refs = node
                .inputs
                .iter()
                .map(|name| {
                    values.get(name.as_str()).ok_or_else(|| {
                        IrError::InvalidGraph(format!("value '{name}' is not available"))
                    })
                })
                .collect::<Result<Vec<&Tensor>>>()?;

            let op = self.registry.get(&node.op_type)?;
            let outputs = op.execute(&input_refs, &node.attributes)?;
            if outputs.len() != node.outputs.len() {
                return Err(IrError::InvalidGraph(format!(
                    "{} produced {} outputs, node declares {}",
                    node.op_type,
                    outputs.len(),
                    node.outputs.len()
                )));
            }
            for (name, tensor) in node.outputs.iter().zip(outputs) {
                values.insert(name.as_str(), Self::lower(&self.options, tensor)?);
            }
        }

        self.model
            .outputs
            .iter()
            .map(|info| {
                let tensor = values.get(info.name.as_str()).ok_or_else(|| {
                    IrError::InvalidGraph(format!("Output tensor not found: {}", info.name))
                })?;
                if tensor.dtype() == info.spec.dtype {
                    Ok(tensor.clone())
                } else {
                    Ok(tensor.cast(info.spec.dtype)?)
                }
            })
            .collect()
    }

    /// Hold float values at the session's precision.
    fn lower(options: &SessionOptions, tensor: Tensor) -> Result<Tensor> {
        match options.precision() {
            Precision::FP16 if tensor.dtype().is_float() && tensor.dtype() != DataType::F16 => {
                Ok(tensor.cast(DataType::F16)?)
            }
            _ => Ok(tensor),
        }
    }

    fn validate_inputs(&self, inputs: &[Tensor]) -> Result<()> {
        if inputs.len() != self.model.inputs.len() {
            return Err(IrError::InvalidInput(format!(
                "model takes {} inputs, {} supplied",
                self.model.inputs.len(),
                inputs.len()
            )));
        }
        for (info, tensor) in self.model.inputs.iter().zip(inputs) {
            if tensor.dtype() != info.spec.dtype {
                return Err(IrError::InvalidInput(format!(
                    "input '{}' expects {}, got {}",
                    info.name,
                    info.spec.dtype,
                    tensor.dtype()
                )));
            }
            if tensor.rank() != info.spec.rank() {
                return Err(IrError::InvalidInput(format!(
                    "input '{}' expects rank {}, got {}",
                    info.name,
                    info.spec.rank(),
                    tensor.rank()
                )));
            }
        }
        Ok(())
    }

    /// Get session options
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Get the model being executed
    pub fn model(&self) -> &IrModel {
        &self.model
    }
}
