//! State shared by translators while one model is converted.

use crate::error::{FrontendError, Result};
use crate::model::FrameworkModel;
use opcheck_core::{DataType, GraphBuilder, NodeAttribute, Tensor, TensorData, TensorSpec};
use opcheck_ir::{IrModel, ValueInfo};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Emits IR nodes and constants, and maps framework values to IR values.
pub struct TranslateContext<'m> {
    model: &'m FrameworkModel,
    builder: GraphBuilder,
    names: HashMap<String, String>,
    initializers: BTreeMap<String, TensorData>,
    constant_count: usize,
}

impl<'m> TranslateContext<'m> {
    pub(crate) fn new(model: &'m FrameworkModel) -> Self {
        Self {
            model,
            builder: GraphBuilder::new("ir"),
            names: HashMap::new(),
            initializers: BTreeMap::new(),
            constant_count: 0,
        }
    }

    pub(crate) fn declare_input(&mut self, name: &str) {
        self.builder.add_graph_input(name);
        self.names.insert(name.to_string(), name.to_string());
    }

    pub(crate) fn bind(&mut self, framework_name: &str, ir_name: String) {
        self.names.insert(framework_name.to_string(), ir_name);
    }

    /// Observed spec of a framework value.
    pub fn spec(&self, framework_name: &str) -> Result<&TensorSpec> {
        self.model.spec(framework_name)
    }

    /// IR value holding a framework value; framework constants become initializers.
    pub fn input(&mut self, framework_name: &str) -> Result<String> {
        if let Some(name) = self.names.get(framework_name) {
            return Ok(name.clone());
        }
        let data = self.model.constants.get(framework_name).ok_or_else(|| {
            FrontendError::InvalidModel(format!("value '{framework_name}' has no producer"))
        })?;
        self.initializers
            .insert(framework_name.to_string(), data.clone());
        self.names
            .insert(framework_name.to_string(), framework_name.to_string());
        Ok(framework_name.to_string())
    }

    /// Add a constant tensor and return its IR name.
    pub fn constant(&mut self, tensor: &Tensor) -> Result<String> {
        let name = format!("ir_const{}", self.constant_count);
        self.constant_count += 1;
        self.initializers.insert(name.clone(), tensor.to_tensor_data()?);
        Ok(name)
    }

    /// 1-D `int64` constant.
    pub fn i64_constant(&mut self, values: &[i64]) -> Result<String> {
        let tensor = Tensor::from_i64(values.to_vec(), vec![values.len()])?;
        self.constant(&tensor)
    }

    /// Rank-0 constant of `dtype`.
    pub fn scalar(&mut self, value: f64, dtype: DataType) -> Result<String> {
        let tensor = Tensor::full(value, vec![], dtype)?;
        self.constant(&tensor)
    }

    /// Append a single-output IR node.
    pub fn emit(
        &mut self,
        op_type: &str,
        inputs: &[String],
        attributes: HashMap<String, NodeAttribute>,
    ) -> String {
        let mut outputs = self.builder.add_op(op_type, inputs, attributes, 1);
        outputs.remove(0)
    }

    pub(crate) fn finish(self, ir_version: i64, producer: &str) -> Result<IrModel> {
        let model = self.model;
        let mut ir = IrModel::new(producer);
        ir.ir_version = ir_version;
        ir.source_ops = model.op_tags();

        for name in model.input_names() {
            ir.inputs
                .push(ValueInfo::new(name.clone(), model.spec(name)?.clone()));
        }

        let mut outputs = Vec::with_capacity(model.output_names().len());
        for name in model.output_names() {
            let ir_name = self.names.get(name).cloned().ok_or_else(|| {
                FrontendError::InvalidModel(format!("output '{name}' was never produced"))
            })?;
            ir.outputs
                .push(ValueInfo::new(ir_name.clone(), model.spec(name)?.clone()));
            outputs.push(ir_name);
        }

        let mut builder = self.builder;
        builder.set_outputs(outputs);
        builder.add_metadata("source_model", model.name.clone());
        let constants: HashSet<String> = self.initializers.keys().cloned().collect();
        ir.graph = builder.build(&constants)?;
        ir.initializers = self.initializers;
        Ok(ir)
    }
}

/// One-entry attribute map.
pub(crate) fn attr(name: &str, value: NodeAttribute) -> HashMap<String, NodeAttribute> {
    let mut attrs = HashMap::new();
    attrs.insert(name.to_string(), value);
    attrs
}
