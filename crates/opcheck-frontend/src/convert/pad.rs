//! Lowering of `aten::pad`.

use super::context::{attr, TranslateContext};
use super::OpTranslator;
use crate::error::{FrontendError, Result};
use crate::kernels::{float_attr, mode_attr};
use opcheck_core::ops::padding::expand_pads;
use opcheck_core::{DataType, GraphNode, NodeAttribute, PadMode};
use opcheck_ir::IrPadMode;
use std::collections::HashMap;

const TAG: &str = "aten::pad";

/// `aten::pad` with static widths (attribute `pads`) or a runtime pad list
/// (second input).
///
/// Constant, reflect and replicate map onto the IR `Pad` operator. Circular
/// padding has no IR mode and is lowered to crops (`Slice`) followed by
/// wrap-around concatenation, one dimension at a time.
pub struct PadTranslator;

impl OpTranslator for PadTranslator {
    fn op_tag(&self) -> &str {
        TAG
    }

    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>> {
        let data = node
            .inputs
            .first()
            .ok_or_else(|| FrontendError::conversion(TAG, "missing data input"))?;
        let spec = ctx.spec(data)?.clone();
        let mode = mode_attr(&node.attributes)?;
        let value = float_attr(&node.attributes, "value")?.unwrap_or(0.0);
        let x = ctx.input(data)?;

        let out = match node.inputs.get(1) {
            None => {
                let pads = node
                    .attributes
                    .get("pads")
                    .and_then(NodeAttribute::as_ints)
                    .ok_or_else(|| FrontendError::conversion(TAG, "static pads missing"))?;
                let per_dim = expand_pads(pads, spec.rank())?;
                if mode == PadMode::Circular {
                    lower_circular(ctx, x, &spec.shape, &per_dim)?
                } else {
                    let begins: Vec<i64> = per_dim.iter().map(|&(b, _)| b).collect();
                    let ends: Vec<i64> = per_dim.iter().map(|&(_, e)| e).collect();
                    let begins = ctx.i64_constant(&begins)?;
                    let ends = ctx.i64_constant(&ends)?;
                    emit_pad(ctx, x, begins, ends, mode, value, spec.dtype)?
                }
            }
            Some(list) => {
                if mode == PadMode::Circular {
                    return Err(FrontendError::conversion(
                        TAG,
                        "circular padding requires static widths",
                    ));
                }
                let (begins, ends) = dynamic_pads(ctx, list, spec.rank())?;
                emit_pad(ctx, x, begins, ends, mode, value, spec.dtype)?
            }
        };
        Ok(vec![out])
    }
}

fn emit_pad(
    ctx: &mut TranslateContext<'_>,
    x: String,
    begins: String,
    ends: String,
    mode: PadMode,
    value: f64,
    dtype: DataType,
) -> Result<String> {
    let ir_mode = match mode {
        PadMode::Constant => IrPadMode::Constant,
        PadMode::Reflect => IrPadMode::Reflect,
        PadMode::Replicate => IrPadMode::Edge,
        PadMode::Circular => {
            return Err(FrontendError::conversion(TAG, "circular has no Pad mode"));
        }
    };
    let mut inputs = vec![x, begins, ends];
    if ir_mode == IrPadMode::Constant {
        inputs.push(ctx.scalar(value, dtype)?);
    }
    let attrs = attr(
        "pad_mode",
        NodeAttribute::String(ir_mode.name().to_string()),
    );
    Ok(ctx.emit("Pad", &inputs, attrs))
}

/// Reorder a runtime pad list (pairs from the last dimension) into per-dimension
/// begin and end vectors of length `rank`.
fn dynamic_pads(
    ctx: &mut TranslateContext<'_>,
    list: &str,
    rank: usize,
) -> Result<(String, String)> {
    let list_spec = ctx.spec(list)?.clone();
    let len = match list_spec.shape.as_slice() {
        [len] => *len,
        other => {
            return Err(FrontendError::conversion(
                TAG,
                format!("pad list must be 1-D, got shape {other:?}"),
            ))
        }
    };
    if len % 2 != 0 || len / 2 > rank {
        return Err(FrontendError::conversion(
            TAG,
            format!("pad list of length {len} does not fit a rank-{rank} input"),
        ));
    }
    let pairs = len / 2;

    let mut pads = ctx.input(list)?;
    if list_spec.dtype != DataType::I64 {
        let to_i64 = attr(
            "destination_type",
            NodeAttribute::String(DataType::I64.name().to_string()),
        );
        pads = ctx.emit("Convert", &[pads], to_i64);
    }

    let begins = gather_side(ctx, &pads, pairs, rank, 0)?;
    let ends = gather_side(ctx, &pads, pairs, rank, 1)?;
    Ok((begins, ends))
}

/// Entries `offset, offset + 2, ...` of the pad list, last pair first,
/// left-filled with zeros up to `rank`.
fn gather_side(
    ctx: &mut TranslateContext<'_>,
    pads: &str,
    pairs: usize,
    rank: usize,
    offset: i64,
) -> Result<String> {
    let picks: Vec<i64> = (0..pairs as i64).rev().map(|i| 2 * i + offset).collect();
    let picks = ctx.i64_constant(&picks)?;
    let gathered = ctx.emit(
        "Gather",
        &[pads.to_string(), picks],
        attr("axis", NodeAttribute::Int(0)),
    );
    if rank == pairs {
        return Ok(gathered);
    }
    let zeros = ctx.i64_constant(&vec![0; rank - pairs])?;
    Ok(ctx.emit(
        "Concat",
        &[zeros, gathered],
        attr("axis", NodeAttribute::Int(0)),
    ))
}

fn slice(ctx: &mut TranslateContext<'_>, x: &str, start: i64, end: i64, axis: usize) -> String {
    let mut attrs = HashMap::new();
    attrs.insert("starts".to_string(), NodeAttribute::IntArray(vec![start]));
    attrs.insert("ends".to_string(), NodeAttribute::IntArray(vec![end]));
    attrs.insert("axes".to_string(), NodeAttribute::IntArray(vec![axis as i64]));
    ctx.emit("Slice", &[x.to_string()], attrs)
}

fn lower_circular(
    ctx: &mut TranslateContext<'_>,
    x: String,
    shape: &[usize],
    per_dim: &[(i64, i64)],
) -> Result<String> {
    let mut current = x;
    for (axis, &(begin, end)) in per_dim.iter().enumerate() {
        if begin == 0 && end == 0 {
            continue;
        }
        let size = shape[axis] as i64;
        let crop_begin = (-begin).max(0);
        let crop_end = (-end).max(0);
        let body = size - crop_begin - crop_end;
        let left = begin.max(0);
        let right = end.max(0);
        if body < 0 || left > body || right > body || (body == 0 && left + right > 0) {
            return Err(FrontendError::conversion(
                TAG,
                format!("circular pads ({begin}, {end}) do not fit dimension {axis} of size {size}"),
            ));
        }

        if crop_begin > 0 || crop_end > 0 {
            current = slice(ctx, &current, crop_begin, size - crop_end, axis);
        }
        if left == 0 && right == 0 {
            continue;
        }

        let mut parts = Vec::with_capacity(3);
        if left > 0 {
            parts.push(slice(ctx, &current, body - left, body, axis));
        }
        parts.push(current.clone());
        if right > 0 {
            parts.push(slice(ctx, &current, 0, right, axis));
        }
        current = ctx.emit(
            "Concat",
            &parts,
            attr("axis", NodeAttribute::Int(axis as i64)),
        );
    }
    Ok(current)
}
