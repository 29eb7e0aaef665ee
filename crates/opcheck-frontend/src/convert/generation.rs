//! Lowering of value-producing and type operators.

use super::context::{attr, TranslateContext};
use super::OpTranslator;
use crate::error::{FrontendError, Result};
use crate::kernels::{dtype_attr, float_attr};
use opcheck_core::{DataType, GraphNode, NodeAttribute};
use std::collections::HashMap;

/// `fill_any_like(x, value, dtype)` as `ShapeOf` + `Broadcast` of a scalar.
pub struct FillAnyLikeTranslator;

impl OpTranslator for FillAnyLikeTranslator {
    fn op_tag(&self) -> &str {
        "fill_any_like"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let source = node
            .inputs
            .first()
            .ok_or_else(|| FrontendError::conversion(self.op_tag(), "missing input"))?;
        let value = float_attr(&node.attributes, "value")?
            .ok_or_else(|| FrontendError::conversion(self.op_tag(), "missing value"))?;
        let dtype = match dtype_attr(&node.attributes, "dtype")? {
            Some(dtype) => dtype,
            None => ctx.spec(source)?.dtype,
        };

        let x = ctx.input(source)?;
        let shape = ctx.emit("ShapeOf", &[x], HashMap::new());
        let fill = ctx.scalar(value, dtype)?;
        Ok(vec![ctx.emit("Broadcast", &[fill, shape], HashMap::new())])
    }
}

/// `cast(x, dtype)` as `Convert`.
pub struct CastTranslator;

impl OpTranslator for CastTranslator {
    fn op_tag(&self) -> &str {
        "cast"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let source = node
            .inputs
            .first()
            .ok_or_else(|| FrontendError::conversion(self.op_tag(), "missing input"))?;
        let dtype = dtype_attr(&node.attributes, "dtype")?
            .ok_or_else(|| FrontendError::conversion(self.op_tag(), "missing dtype"))?;
        let x = ctx.input(source)?;
        Ok(vec![ctx.emit(
            "Convert",
            &[x],
            attr(
                "destination_type",
                NodeAttribute::String(dtype.name().to_string()),
            ),
        )])
    }
}

/// `prim::ListConstruct` of integer scalars as a 1-D `int64` `Concat`.
pub struct ListConstructTranslator;

impl OpTranslator for ListConstructTranslator {
    fn op_tag(&self) -> &str {
        "prim::ListConstruct"
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        if node.inputs.is_empty() {
            return Err(FrontendError::conversion(self.op_tag(), "empty list"));
        }
        let one = ctx.i64_constant(&[1])?;
        let mut items = Vec::with_capacity(node.inputs.len());
        for item in &node.inputs {
            let spec = ctx.spec(item)?.clone();
            if !spec.dtype.is_integer() || !spec.shape.iter().all(|&d| d == 1) {
                return Err(FrontendError::conversion(
                    self.op_tag(),
                    format!("'{item}' is not an integer scalar"),
                ));
            }
            let value = ctx.input(item)?;
            let mut element = ctx.emit("Reshape", &[value, one.clone()], HashMap::new());
            if spec.dtype != DataType::I64 {
                element = ctx.emit(
                    "Convert",
                    &[element],
                    attr(
                        "destination_type",
                        NodeAttribute::String(DataType::I64.name().to_string()),
                    ),
                );
            }
            items.push(element);
        }
        Ok(vec![ctx.emit(
            "Concat",
            &items,
            attr("axis", NodeAttribute::Int(0)),
        )])
    }
}
