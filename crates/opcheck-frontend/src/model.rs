//! Traced, serializable framework-native models.

use crate::error::{FrontendError, Result};
use crate::kernels::KernelRegistry;
use opcheck_core::{ModelGraph, Tensor, TensorData, TensorSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A captured framework graph with the metadata needed to replay or convert it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkModel {
    /// Model name.
    pub name: String,
    /// Operator graph in framework vocabulary.
    pub graph: ModelGraph,
    /// Element type and shape of every value observed while tracing.
    pub value_info: BTreeMap<String, TensorSpec>,
    /// Constant tensors captured during tracing.
    pub constants: BTreeMap<String, TensorData>,
}

impl FrameworkModel {
    /// Names of the graph inputs, in feed order.
    pub fn input_names(&self) -> &[String] {
        &self.graph.inputs
    }

    /// Names of the graph outputs, in fetch order.
    pub fn output_names(&self) -> &[String] {
        &self.graph.outputs
    }

    /// Observed spec of a value.
    pub fn spec(&self, name: &str) -> Result<&TensorSpec> {
        self.value_info
            .get(name)
            .ok_or_else(|| FrontendError::InvalidModel(format!("no value info for '{name}'")))
    }

    /// Whether any node carries `op_tag`.
    pub fn contains_op(&self, op_tag: &str) -> bool {
        !self.graph.find_nodes_by_op(op_tag).is_empty()
    }

    /// Distinct operator tags in node order.
    pub fn op_tags(&self) -> Vec<String> {
        self.graph
            .op_types()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Execute the graph eagerly on `inputs` (feed order).
    pub fn run(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        if inputs.len() != self.graph.inputs.len() {
            return Err(FrontendError::InvalidModel(format!(
                "{} expects {} inputs, got {}",
                self.name,
                self.graph.inputs.len(),
                inputs.len()
            )));
        }

        let kernels = KernelRegistry::new();
        let mut values: HashMap<&str, Tensor> = HashMap::new();
        for (name, data) in &self.constants {
            values.insert(name.as_str(), Tensor::from_tensor_data(data)?);
        }
        for (name, tensor) in self.graph.inputs.iter().zip(inputs) {
            values.insert(name.as_str(), tensor.clone());
        }

        for node in self.graph.execution_order()? {
            debug!("Eager {} ({})", node.id, node.op_type);
            let kernel = kernels.get(&node.op_type)?;
            let args = node
                .inputs
                .iter()
                .map(|name| {
                    values.get(name.as_str()).ok_or_else(|| {
                        FrontendError::InvalidModel(format!("value '{name}' is not available"))
                    })
                })
                .collect::<Result<Vec<&Tensor>>>()?;
            let outputs = kernel(&args, &node.attributes)?;
            for (name, tensor) in node.outputs.iter().zip(outputs) {
                values.insert(name.as_str(), tensor);
            }
        }

        self.graph
            .outputs
            .iter()
            .map(|name| {
                values.get(name.as_str()).cloned().ok_or_else(|| {
                    FrontendError::InvalidModel(format!("output '{name}' was not computed"))
                })
            })
            .collect()
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse from JSON bytes and re-derive graph edges.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut model: FrameworkModel = serde_json::from_slice(bytes)?;
        model.graph.rebuild_edges()?;
        let constants: HashSet<String> = model.constants.keys().cloned().collect();
        model.graph.validate(&constants)?;
        Ok(model)
    }

    /// Write to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Read from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }
}
