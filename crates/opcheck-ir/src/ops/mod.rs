//! IR operator implementations.
//!
//! Each operator works on opcheck-core tensors and reads its configuration
//! from node attributes. Operators never consult framework-side state: the
//! converted model must be executable on its own.

mod generation;
mod math;
mod pad;
mod tensor_ops;

pub use generation::*;
pub use math::*;
pub use pad::*;
pub use tensor_ops::*;

use crate::error::{IrError, Result};
use opcheck_core::{NodeAttribute, Tensor};
use std::collections::HashMap;

/// An executable IR op type.
pub trait IrOperator: Send + Sync {
    /// Name nodes refer to this op by.
    fn op_type(&self) -> &str;

    /// Compute the node's outputs from its resolved inputs.
    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>>;
}

/// Op types a session can execute, keyed by name.
pub struct OperatorRegistry {
    operators: HashMap<String, Box<dyn IrOperator>>,
}

impl OperatorRegistry {
    /// Registry holding every built-in op.
    pub fn new() -> Self {
        let builtins: [Box<dyn IrOperator>; 14] = [
            Box::new(AddOp),
            Box::new(SubtractOp),
            Box::new(MultiplyOp),
            Box::new(DivideOp),
            Box::new(MatMulOp),
            Box::new(SoftmaxOp),
            Box::new(ReshapeOp),
            Box::new(ConcatOp),
            Box::new(SliceOp),
            Box::new(GatherOp),
            Box::new(ShapeOfOp),
            Box::new(BroadcastOp),
            Box::new(ConvertOp),
            Box::new(PadOp),
        ];
        let mut registry = Self {
            operators: HashMap::with_capacity(builtins.len()),
        };
        for op in builtins {
            registry.register(op);
        }
        registry
    }

    /// Add or replace an op.
    pub fn register(&mut self, op: Box<dyn IrOperator>) {
        self.operators.insert(op.op_type().to_owned(), op);
    }

    /// Look up an op, failing with [`IrError::UnsupportedOperator`].
    pub fn get(&self, op_type: &str) -> Result<&dyn IrOperator> {
        match self.operators.get(op_type) {
            Some(op) => Ok(op.as_ref()),
            None => Err(IrError::UnsupportedOperator {
                op_type: op_type.to_owned(),
            }),
        }
    }

    /// Whether `op_type` is registered.
    pub fn is_supported(&self, op_type: &str) -> bool {
        self.operators.contains_key(op_type)
    }

    /// Registered op names, sorted.
    pub fn supported_operators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operators.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn expect_inputs(
    op_type: &str,
    inputs: &[&Tensor],
    min: usize,
    max: usize,
) -> Result<()> {
    if inputs.len() < min || inputs.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min}..={max}")
        };
        return Err(IrError::InvalidGraph(format!(
            "{op_type} expects {expected} inputs, got {}",
            inputs.len()
        )));
    }
    Ok(())
}

pub(crate) fn int_attr(
    attributes: &HashMap<String, NodeAttribute>,
    name: &str,
) -> Result<Option<i64>> {
    match attributes.get(name) {
        None => Ok(None),
        Some(attr) => attr.as_int().map(Some).ok_or_else(|| IrError::InvalidAttribute {
            name: name.to_string(),
            reason: "expected an integer".to_string(),
        }),
    }
}

pub(crate) fn ints_attr<'a>(
    attributes: &'a HashMap<String, NodeAttribute>,
    name: &str,
) -> Result<&'a [i64]> {
    attributes
        .get(name)
        .and_then(NodeAttribute::as_ints)
        .ok_or_else(|| IrError::InvalidAttribute {
            name: name.to_string(),
            reason: "expected an integer array".to_string(),
        })
}

pub(crate) fn str_attr<'a>(
    attributes: &'a HashMap<String, NodeAttribute>,
    name: &str,
) -> Result<Option<&'a str>> {
    match attributes.get(name) {
        None => Ok(None),
        Some(attr) => attr.as_str().map(Some).ok_or_else(|| IrError::InvalidAttribute {
            name: name.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

/// Resolve a possibly negative axis against `rank`.
pub(crate) fn normalize_axis(axis: i64, rank: usize) -> Result<usize> {
    let rank_i = rank as i64;
    let resolved = if axis < 0 { axis + rank_i } else { axis };
    if resolved < 0 || resolved >= rank_i {
        return Err(IrError::InvalidAttribute {
            name: "axis".to_string(),
            reason: format!("axis {axis} out of range for rank {rank}"),
        });
    }
    Ok(resolved as usize)
}

/// Read a 1-D integer tensor as a list of dimensions; negative entries are rejected.
pub(crate) fn read_dims(op_type: &str, tensor: &Tensor) -> Result<Vec<usize>> {
    tensor
        .to_vec_i64()?
        .into_iter()
        .map(|d| {
            usize::try_from(d).map_err(|_| {
                IrError::InvalidGraph(format!("{op_type}: negative dimension {d} in target shape"))
            })
        })
        .collect()
}
