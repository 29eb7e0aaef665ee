//! Eager kernel table keyed by framework operator tag.
//!
//! The tracer runs these to produce values while recording, and
//! [`crate::FrameworkModel::run`] uses them to interpret a saved graph.

use crate::error::{FrontendError, Result};
use crate::functional;
use opcheck_core::{DataType, NodeAttribute, PadMode, Tensor};
use std::collections::HashMap;

/// Signature shared by all eager kernels.
pub type Kernel = fn(&[&Tensor], &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>>;

/// Operator tag to kernel mapping.
pub struct KernelRegistry {
    kernels: HashMap<&'static str, Kernel>,
}

impl KernelRegistry {
    /// Registry with every built-in kernel.
    pub fn new() -> Self {
        let mut registry = Self {
            kernels: HashMap::new(),
        };
        registry.register("aten::pad", pad_kernel);
        registry.register("aten::addmm", addmm_kernel);
        registry.register("aten::floor_divide", floor_divide_kernel);
        registry.register("aten::sub", sub_kernel);
        registry.register("aten::flatten", flatten_kernel);
        registry.register("aten::softmax", softmax_kernel);
        registry.register("prim::ListConstruct", list_construct_kernel);
        registry.register("fill_any_like", fill_any_like_kernel);
        registry.register("cast", cast_kernel);
        registry
    }

    /// Register or replace a kernel.
    pub fn register(&mut self, op_tag: &'static str, kernel: Kernel) {
        self.kernels.insert(op_tag, kernel);
    }

    /// Look up a kernel.
    pub fn get(&self, op_tag: &str) -> Result<Kernel> {
        self.kernels
            .get(op_tag)
            .copied()
            .ok_or_else(|| FrontendError::UnsupportedOperator {
                op_tag: op_tag.to_string(),
            })
    }

    /// Check if a tag has a kernel.
    pub fn is_supported(&self, op_tag: &str) -> bool {
        self.kernels.contains_key(op_tag)
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn arity(op_tag: &str, inputs: &[&Tensor], min: usize, max: usize) -> Result<()> {
    if inputs.len() < min || inputs.len() > max {
        return Err(FrontendError::InvalidModel(format!(
            "{op_tag} takes {min}..={max} inputs, got {}",
            inputs.len()
        )));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> FrontendError {
    FrontendError::InvalidAttribute {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn float_attr(attrs: &HashMap<String, NodeAttribute>, name: &str) -> Result<Option<f64>> {
    match attrs.get(name) {
        None => Ok(None),
        Some(attr) => attr
            .as_float()
            .map(Some)
            .ok_or_else(|| invalid(name, "expected a number")),
    }
}

pub(crate) fn int_attr(attrs: &HashMap<String, NodeAttribute>, name: &str) -> Result<Option<i64>> {
    match attrs.get(name) {
        None => Ok(None),
        Some(attr) => attr
            .as_int()
            .map(Some)
            .ok_or_else(|| invalid(name, "expected an integer")),
    }
}

pub(crate) fn str_attr<'a>(
    attrs: &'a HashMap<String, NodeAttribute>,
    name: &str,
) -> Result<Option<&'a str>> {
    match attrs.get(name) {
        None => Ok(None),
        Some(attr) => attr
            .as_str()
            .map(Some)
            .ok_or_else(|| invalid(name, "expected a string")),
    }
}

pub(crate) fn dtype_attr(
    attrs: &HashMap<String, NodeAttribute>,
    name: &str,
) -> Result<Option<DataType>> {
    Ok(str_attr(attrs, name)?.map(str::parse).transpose()?)
}

pub(crate) fn mode_attr(attrs: &HashMap<String, NodeAttribute>) -> Result<PadMode> {
    Ok(str_attr(attrs, "mode")?.unwrap_or("constant").parse()?)
}

fn pad_kernel(inputs: &[&Tensor], attrs: &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>> {
    arity("aten::pad", inputs, 1, 2)?;
    let pads = match inputs.get(1) {
        Some(list) => list.to_vec_i64()?,
        None => attrs
            .get("pads")
            .and_then(NodeAttribute::as_ints)
            .ok_or_else(|| invalid("pads", "static pads need an integer list"))?
            .to_vec(),
    };
    let mode = mode_attr(attrs)?;
    let value = float_attr(attrs, "value")?;
    Ok(vec![functional::pad(inputs[0], &pads, mode, value)?])
}

fn addmm_kernel(inputs: &[&Tensor], attrs: &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>> {
    arity("aten::addmm", inputs, 3, 3)?;
    let beta = float_attr(attrs, "beta")?.unwrap_or(1.0);
    let alpha = float_attr(attrs, "alpha")?.unwrap_or(1.0);
    Ok(vec![functional::addmm(inputs[0], inputs[1], inputs[2], beta, alpha)?])
}

fn floor_divide_kernel(
    inputs: &[&Tensor],
    _attrs: &HashMap<String, NodeAttribute>,
) -> Result<Vec<Tensor>> {
    arity("aten::floor_divide", inputs, 2, 2)?;
    Ok(vec![functional::floor_divide(inputs[0], inputs[1])?])
}

fn sub_kernel(inputs: &[&Tensor], attrs: &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>> {
    arity("aten::sub", inputs, 2, 2)?;
    let alpha = float_attr(attrs, "alpha")?.unwrap_or(1.0);
    Ok(vec![functional::sub(inputs[0], inputs[1], alpha)?])
}

fn flatten_kernel(inputs: &[&Tensor], attrs: &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>> {
    arity("aten::flatten", inputs, 1, 1)?;
    let start = int_attr(attrs, "start_dim")?.unwrap_or(0);
    Ok(vec![functional::flatten(inputs[0], start)?])
}

fn softmax_kernel(inputs: &[&Tensor], attrs: &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>> {
    arity("aten::softmax", inputs, 1, 1)?;
    let dim = int_attr(attrs, "dim")?.unwrap_or(-1);
    Ok(vec![functional::softmax(inputs[0], dim)?])
}

fn list_construct_kernel(
    inputs: &[&Tensor],
    _attrs: &HashMap<String, NodeAttribute>,
) -> Result<Vec<Tensor>> {
    Ok(vec![functional::list_construct(inputs)?])
}

fn fill_any_like_kernel(
    inputs: &[&Tensor],
    attrs: &HashMap<String, NodeAttribute>,
) -> Result<Vec<Tensor>> {
    arity("fill_any_like", inputs, 1, 1)?;
    let value = float_attr(attrs, "value")?.ok_or_else(|| invalid("value", "missing"))?;
    let dtype = dtype_attr(attrs, "dtype")?;
    Ok(vec![functional::full_like(inputs[0], value, dtype)?])
}

fn cast_kernel(inputs: &[&Tensor], attrs: &HashMap<String, NodeAttribute>) -> Result<Vec<Tensor>> {
    arity("cast", inputs, 1, 1)?;
    let dtype = dtype_attr(attrs, "dtype")?.ok_or_else(|| invalid("dtype", "missing"))?;
    Ok(vec![functional::cast(inputs[0], dtype)?])
}
