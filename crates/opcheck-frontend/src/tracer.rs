//! Graph capture by recording eager execution.
//!
//! Modules describe their computation as calls on a [`Tracer`]. Each call
//! runs the matching eager kernel on the values seen so far and appends a
//! node, so the recorded graph carries concrete specs for every value.

use crate::error::{FrontendError, Result};
use crate::kernels::KernelRegistry;
use crate::model::FrameworkModel;
use crate::module::Module;
use opcheck_core::{GraphBuilder, NodeAttribute, Tensor, TensorData, TensorSpec};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Records operator calls into a framework graph.
pub struct Tracer {
    builder: GraphBuilder,
    kernels: KernelRegistry,
    values: HashMap<String, Tensor>,
    value_info: BTreeMap<String, TensorSpec>,
    constants: BTreeMap<String, TensorData>,
    constant_count: usize,
}

impl Tracer {
    /// Start an empty trace.
    pub fn new() -> Self {
        Self {
            builder: GraphBuilder::new("%"),
            kernels: KernelRegistry::new(),
            values: HashMap::new(),
            value_info: BTreeMap::new(),
            constants: BTreeMap::new(),
            constant_count: 0,
        }
    }

    /// Declare a graph input carrying `example`.
    pub fn input(&mut self, name: &str, example: Tensor) -> Result<String> {
        if self.values.contains_key(name) {
            return Err(FrontendError::Trace(format!("input '{name}' declared twice")));
        }
        self.builder.add_graph_input(name);
        self.record(name.to_string(), example);
        Ok(name.to_string())
    }

    /// Capture a constant tensor.
    pub fn constant(&mut self, tensor: Tensor) -> Result<String> {
        let name = format!("const{}", self.constant_count);
        self.constant_count += 1;
        self.constants.insert(name.clone(), tensor.to_tensor_data()?);
        self.record(name.clone(), tensor);
        Ok(name)
    }

    /// Run `op_tag` eagerly on recorded values and append it to the graph.
    pub fn call(
        &mut self,
        op_tag: &str,
        inputs: &[String],
        attributes: HashMap<String, NodeAttribute>,
    ) -> Result<Vec<String>> {
        let kernel = self.kernels.get(op_tag)?;
        let args = inputs
            .iter()
            .map(|name| {
                self.values
                    .get(name)
                    .ok_or_else(|| FrontendError::Trace(format!("unknown value '{name}'")))
            })
            .collect::<Result<Vec<&Tensor>>>()?;
        let results = kernel(&args, &attributes)?;

        let names = self
            .builder
            .add_op(op_tag, inputs, attributes, results.len());
        debug!("Traced {} -> {:?}", op_tag, names);
        for (name, tensor) in names.iter().zip(results) {
            self.record(name.clone(), tensor);
        }
        Ok(names)
    }

    /// Current value of a recorded tensor.
    pub fn value(&self, name: &str) -> Option<&Tensor> {
        self.values.get(name)
    }

    /// Close the trace with `outputs`, returning the model and the traced output values.
    pub fn finish(mut self, name: &str, outputs: Vec<String>) -> Result<(FrameworkModel, Vec<Tensor>)> {
        let traced = outputs
            .iter()
            .map(|out| {
                self.values
                    .get(out)
                    .cloned()
                    .ok_or_else(|| FrontendError::Trace(format!("unknown output '{out}'")))
            })
            .collect::<Result<Vec<_>>>()?;

        self.builder.set_outputs(outputs);
        self.builder.add_metadata("producer", "opcheck-tracer");
        let constants: HashSet<String> = self.constants.keys().cloned().collect();
        let graph = self.builder.build(&constants)?;

        let model = FrameworkModel {
            name: name.to_string(),
            graph,
            value_info: self.value_info,
            constants: self.constants,
        };
        Ok((model, traced))
    }

    fn record(&mut self, name: String, tensor: Tensor) {
        self.value_info.insert(name.clone(), tensor.spec());
        self.values.insert(name, tensor);
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trace `module` on named example inputs.
pub fn trace_module(
    module: &dyn Module,
    name: &str,
    inputs: &[(String, Tensor)],
) -> Result<FrameworkModel> {
    let mut tracer = Tracer::new();
    let mut names = Vec::with_capacity(inputs.len());
    for (input_name, example) in inputs {
        names.push(tracer.input(input_name, example.clone())?);
    }
    let outputs = module.trace(&mut tracer, &names)?;
    let (model, _) = tracer.finish(name, outputs)?;
    info!(
        "Traced '{}': {} nodes {:?}",
        model.name,
        model.graph.node_count(),
        model.op_tags()
    );
    Ok(model)
}
