//! Lowering of arithmetic, matrix and activation operators.

use super::context::{attr, TranslateContext};
use super::OpTranslator;
use crate::error::{FrontendError, Result};
use crate::kernels::{float_attr, int_attr};
use opcheck_core::{GraphNode, NodeAttribute};
use std::collections::HashMap;

fn operands<'n>(node: &'n GraphNode, count: usize) -> Result<&'n [String]> {
    if node.inputs.len() != count {
        return Err(FrontendError::conversion(
            &node.op_type,
            format!("expected {count} inputs, got {}", node.inputs.len()),
        ));
    }
    Ok(&node.inputs)
}

/// `aten::addmm` as `MatMul`, optional scaling `Multiply`s and an `Add`.
///
/// When `beta == 0` the bias branch is not emitted, so the input's values
/// cannot reach the output.
pub struct AddmmTranslator;

impl OpTranslator for AddmmTranslator {
    fn op_tag(&self) -> &str {
        "aten::addmm"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let args = operands(node, 3)?;
        let dtype = ctx.spec(&args[1])?.dtype;
        let alpha = float_attr(&node.attributes, "alpha")?.unwrap_or(1.0);
        let beta = float_attr(&node.attributes, "beta")?.unwrap_or(1.0);

        let m1 = ctx.input(&args[1])?;
        let m2 = ctx.input(&args[2])?;
        let mut product = ctx.emit("MatMul", &[m1, m2], HashMap::new());
        if alpha != 1.0 {
            let scale = ctx.scalar(alpha, dtype)?;
            product = ctx.emit("Multiply", &[product, scale], HashMap::new());
        }
        if beta == 0.0 {
            return Ok(vec![product]);
        }

        let mut bias = ctx.input(&args[0])?;
        if beta != 1.0 {
            let scale = ctx.scalar(beta, dtype)?;
            bias = ctx.emit("Multiply", &[bias, scale], HashMap::new());
        }
        Ok(vec![ctx.emit("Add", &[product, bias], HashMap::new())])
    }
}

/// `aten::floor_divide` on integers as a flooring `Divide`.
pub struct FloorDivideTranslator;

impl OpTranslator for FloorDivideTranslator {
    fn op_tag(&self) -> &str {
        "aten::floor_divide"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let args = operands(node, 2)?;
        let lhs_type = ctx.spec(&args[0])?.dtype;
        let rhs_type = ctx.spec(&args[1])?.dtype;
        if !lhs_type.is_integer() || !rhs_type.is_integer() {
            return Err(FrontendError::conversion(
                self.op_tag(),
                format!("integer operands required, got {lhs_type} and {rhs_type}"),
            ));
        }

        let lhs = ctx.input(&args[0])?;
        let mut rhs = ctx.input(&args[1])?;
        if rhs_type != lhs_type {
            let to = attr(
                "destination_type",
                NodeAttribute::String(lhs_type.name().to_string()),
            );
            rhs = ctx.emit("Convert", &[rhs], to);
        }
        Ok(vec![ctx.emit("Divide", &[lhs, rhs], HashMap::new())])
    }
}

/// `aten::sub(a, b, alpha)` as `Subtract`, scaling `b` when `alpha != 1`.
pub struct SubTranslator;

impl OpTranslator for SubTranslator {
    fn op_tag(&self) -> &str {
        "aten::sub"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let args = operands(node, 2)?;
        let dtype = ctx.spec(&args[1])?.dtype;
        let alpha = float_attr(&node.attributes, "alpha")?.unwrap_or(1.0);
        let lhs = ctx.input(&args[0])?;
        let mut rhs = ctx.input(&args[1])?;
        if alpha != 1.0 {
            let scale = ctx.scalar(alpha, dtype)?;
            rhs = ctx.emit("Multiply", &[rhs, scale], HashMap::new());
        }
        Ok(vec![ctx.emit("Subtract", &[lhs, rhs], HashMap::new())])
    }
}

/// `aten::flatten(x, start_dim)` as a `Reshape` to the statically known shape.
pub struct FlattenTranslator;

impl OpTranslator for FlattenTranslator {
    fn op_tag(&self) -> &str {
        "aten::flatten"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let args = operands(node, 1)?;
        let shape = ctx.spec(&args[0])?.shape.clone();
        let rank = shape.len() as i64;
        let start = int_attr(&node.attributes, "start_dim")?.unwrap_or(0);
        let start = if start < 0 { start + rank } else { start };
        if start < 0 || start >= rank.max(1) {
            return Err(FrontendError::conversion(
                self.op_tag(),
                format!("start_dim {start} out of range for rank {rank}"),
            ));
        }

        let mut target: Vec<i64> = shape[..start as usize].iter().map(|&d| d as i64).collect();
        target.push(-1);
        let x = ctx.input(&args[0])?;
        let target = ctx.i64_constant(&target)?;
        Ok(vec![ctx.emit("Reshape", &[x, target], HashMap::new())])
    }
}

/// `aten::softmax(x, dim)` as `Softmax`.
pub struct SoftmaxTranslator;

impl OpTranslator for SoftmaxTranslator {
    fn op_tag(&self) -> &str {
        "aten::softmax"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let args = operands(node, 1)?;
        let dim = int_attr(&node.attributes, "dim")?.unwrap_or(-1);
        let x = ctx.input(&args[0])?;
        Ok(vec![ctx.emit(
            "Softmax",
            &[x],
            attr("axis", NodeAttribute::Int(dim)),
        )])
    }
}
