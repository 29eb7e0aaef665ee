//! The converted model: graph, constants and interface description.

use crate::error::{IrError, Result};
use crate::ops::OperatorRegistry;
use opcheck_core::{ModelGraph, Tensor, TensorData, TensorSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Newest IR version this crate writes and reads.
pub const IR_VERSION: i64 = 11;

/// Oldest IR version accepted by the loader and serializer.
pub const MIN_IR_VERSION: i64 = 10;

/// Operator set the registry implements.
pub const OPSET: &str = "opset1";

/// Name, element type and shape of a model input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueInfo {
    /// Tensor name in the graph.
    pub name: String,
    /// Element type and shape observed at conversion time.
    pub spec: TensorSpec,
}

impl ValueInfo {
    /// Create a new value description.
    pub fn new(name: impl Into<String>, spec: TensorSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// A model in the target IR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrModel {
    /// IR version the model was produced with.
    pub ir_version: i64,
    /// Operator set identifier.
    pub opset: String,
    /// Name of the tool that produced the model.
    pub producer: String,
    /// Operator graph.
    pub graph: ModelGraph,
    /// Constant tensors referenced by name from the graph.
    pub initializers: BTreeMap<String, TensorData>,
    /// Graph inputs, in feed order.
    pub inputs: Vec<ValueInfo>,
    /// Graph outputs, in fetch order.
    pub outputs: Vec<ValueInfo>,
    /// Framework operator tags this model was converted from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ops: Vec<String>,
}

impl IrModel {
    /// Create an empty model at the current IR version.
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            ir_version: IR_VERSION,
            opset: OPSET.to_string(),
            producer: producer.into(),
            graph: ModelGraph::new(),
            initializers: BTreeMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            source_ops: Vec::new(),
        }
    }

    /// Names of all initializers.
    pub fn constant_names(&self) -> HashSet<String> {
        self.initializers.keys().cloned().collect()
    }

    /// Materialize an initializer as a tensor.
    pub fn initializer(&self, name: &str) -> Result<Tensor> {
        let data = self
            .initializers
            .get(name)
            .ok_or_else(|| IrError::InvalidGraph(format!("no initializer named '{name}'")))?;
        Ok(Tensor::from_tensor_data(data)?)
    }

    /// Check version, interface consistency, graph structure and operator support.
    pub fn validate(&self, registry: &OperatorRegistry) -> Result<()> {
        check_ir_version(self.ir_version)?;
        if self.opset != OPSET {
            return Err(IrError::ParseError(format!(
                "unknown operator set '{}'",
                self.opset
            )));
        }

        let declared_inputs: Vec<&str> = self.inputs.iter().map(|v| v.name.as_str()).collect();
        if declared_inputs != self.graph.inputs.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(IrError::InvalidGraph(
                "declared inputs do not match graph inputs".to_string(),
            ));
        }
        let declared_outputs: Vec<&str> = self.outputs.iter().map(|v| v.name.as_str()).collect();
        if declared_outputs != self.graph.outputs.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(IrError::InvalidGraph(
                "declared outputs do not match graph outputs".to_string(),
            ));
        }

        for (name, data) in &self.initializers {
            let expected: usize = data.shape.iter().product();
            if data.values.len() != expected {
                return Err(IrError::InvalidGraph(format!(
                    "initializer '{name}' has {} values for shape {:?}",
                    data.values.len(),
                    data.shape
                )));
            }
        }

        self.graph
            .validate(&self.constant_names())
            .map_err(|e| IrError::InvalidGraph(e.to_string()))?;

        for node in &self.graph.nodes {
            if !registry.is_supported(&node.op_type) {
                return Err(IrError::UnsupportedOperator {
                    op_type: node.op_type.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Reject IR versions outside `MIN_IR_VERSION..=IR_VERSION`.
pub fn check_ir_version(version: i64) -> Result<()> {
    if !(MIN_IR_VERSION..=IR_VERSION).contains(&version) {
        return Err(IrError::UnsupportedIrVersion {
            version,
            min: MIN_IR_VERSION,
            max: IR_VERSION,
        });
    }
    Ok(())
}
