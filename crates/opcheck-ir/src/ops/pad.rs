use super::{expect_inputs, str_attr, IrOperator, Result};
use crate::error::IrError;
use opcheck_core::{DataType, NodeAttribute, Tensor};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Border handling of the IR `Pad` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrPadMode {
    /// Fill with `pad_value` (zero when absent).
    Constant,
    /// Repeat the border element.
    Edge,
    /// Mirror without repeating the border element.
    Reflect,
}

impl IrPadMode {
    /// Attribute spelling.
    pub fn name(self) -> &'static str {
        match self {
            IrPadMode::Constant => "constant",
            IrPadMode::Edge => "edge",
            IrPadMode::Reflect => "reflect",
        }
    }
}

impl fmt::Display for IrPadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IrPadMode {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(IrPadMode::Constant),
            "edge" => Ok(IrPadMode::Edge),
            "reflect" => Ok(IrPadMode::Reflect),
            other => Err(IrError::InvalidAttribute {
                name: "pad_mode".to_string(),
                reason: format!("unknown mode '{other}'"),
            }),
        }
    }
}

/// Pad: `data`, `pads_begin`, `pads_end` and an optional scalar `pad_value`.
///
/// `pads_begin`/`pads_end` hold one entry per dimension in natural order.
/// Negative entries remove elements from that side.
pub struct PadOp;

impl PadOp {
    /// Source position for output coordinate `p` (already shifted by the
    /// begin pad) in a dimension of size `n`, or `None` for fill.
    fn source(mode: IrPadMode, p: i64, n: i64) -> Option<i64> {
        if (0..n).contains(&p) {
            return Some(p);
        }
        match mode {
            IrPadMode::Constant => None,
            IrPadMode::Edge => Some(p.clamp(0, n - 1)),
            IrPadMode::Reflect => Some(if p < 0 { -p } else { 2 * (n - 1) - p }),
        }
    }
}

impl IrOperator for PadOp {
    fn op_type(&self) -> &str {
        "Pad"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Pad", inputs, 3, 4)?;
        let data = inputs[0];
        let shape = data.shape();
        let rank = shape.len();
        let begins = inputs[1].to_vec_i64()?;
        let ends = inputs[2].to_vec_i64()?;
        if begins.len() != rank || ends.len() != rank {
            return Err(IrError::InvalidInput(format!(
                "Pad of a rank-{rank} tensor needs {rank} begin and end pads, got {} and {}",
                begins.len(),
                ends.len()
            )));
        }

        let mode: IrPadMode = str_attr(attributes, "pad_mode")?
            .unwrap_or("constant")
            .parse()?;
        let value = inputs.get(3).filter(|_| mode == IrPadMode::Constant);

        let mut out_shape = Vec::with_capacity(rank);
        for d in 0..rank {
            let n = shape[d] as i64;
            let size = n + begins[d] + ends[d];
            if size < 0 {
                return Err(IrError::InvalidInput(format!(
                    "Pad removes more than the {n} elements of dimension {d}"
                )));
            }
            if mode == IrPadMode::Reflect && (begins[d] >= n || ends[d] >= n) {
                return Err(IrError::InvalidInput(format!(
                    "reflect pads ({}, {}) must be smaller than dimension {d} of size {n}",
                    begins[d], ends[d]
                )));
            }
            if mode == IrPadMode::Edge && n == 0 && size > 0 {
                return Err(IrError::InvalidInput(format!(
                    "cannot edge-pad empty dimension {d}"
                )));
            }
            out_shape.push(size as usize);
        }

        let mut in_strides = vec![1usize; rank];
        for d in (0..rank.saturating_sub(1)).rev() {
            in_strides[d] = in_strides[d + 1] * shape[d + 1];
        }

        let total: usize = out_shape.iter().product();
        let mut offsets = Vec::with_capacity(total);
        let mut coord = vec![0usize; rank];
        for _ in 0..total {
            let mut offset = Some(0usize);
            for d in 0..rank {
                let p = coord[d] as i64 - begins[d];
                offset = match (offset, Self::source(mode, p, shape[d] as i64)) {
                    (Some(acc), Some(s)) => Some(acc + s as usize * in_strides[d]),
                    _ => None,
                };
            }
            offsets.push(offset);

            for d in (0..rank).rev() {
                coord[d] += 1;
                if coord[d] < out_shape[d] {
                    break;
                }
                coord[d] = 0;
            }
        }

        // Integers go through i64 so values past 2^53 survive.
        let dtype = data.dtype();
        let padded = if dtype.is_integer() || dtype == DataType::Bool {
            let fill = match value {
                Some(v) => v.to_vec_i64()?.first().copied().unwrap_or(0),
                None => 0,
            };
            let values = gather(&data.to_vec_i64()?, &offsets, fill);
            Tensor::from_i64(values, out_shape)?.cast(dtype)?
        } else {
            let fill = match value {
                Some(v) => v.to_vec_f64()?.first().copied().unwrap_or(0.0),
                None => 0.0,
            };
            let values = gather(&data.to_vec_f64()?, &offsets, fill);
            Tensor::from_f64(values, out_shape, dtype)?
        };
        Ok(vec![padded])
    }
}

fn gather<T: Copy>(src: &[T], offsets: &[Option<usize>], fill: T) -> Vec<T> {
    offsets.iter().map(|o| o.map_or(fill, |o| src[o])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        x: &Tensor,
        begin: Vec<i64>,
        end: Vec<i64>,
        mode: &str,
        value: Option<f64>,
    ) -> Result<Tensor> {
        let rank = begin.len();
        let b = Tensor::from_i64(begin, vec![rank]).unwrap();
        let e = Tensor::from_i64(end, vec![rank]).unwrap();
        let v = value.map(|v| Tensor::full(v, vec![], x.dtype()).unwrap());
        let mut inputs = vec![x, &b, &e];
        if let Some(v) = v.as_ref() {
            inputs.push(v);
        }
        let mut attrs = HashMap::new();
        attrs.insert("pad_mode".to_string(), NodeAttribute::String(mode.to_string()));
        Ok(PadOp.execute(&inputs, &attrs)?.remove(0))
    }

    fn row(values: &[f32]) -> Tensor {
        Tensor::from_data(values.to_vec(), vec![1, values.len()], DataType::F32).unwrap()
    }

    #[test]
    fn test_constant_with_value() {
        let out = run(&row(&[1.0, 2.0]), vec![0, 1], vec![0, 2], "constant", Some(9.0)).unwrap();
        assert_eq!(out.to_vec().unwrap(), vec![9.0, 1.0, 2.0, 9.0, 9.0]);
    }

    #[test]
    fn test_edge_and_reflect() {
        let x = row(&[1.0, 2.0, 3.0]);
        let edge = run(&x, vec![0, 2], vec![0, 1], "edge", None).unwrap();
        assert_eq!(edge.to_vec().unwrap(), vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0]);
        let reflect = run(&x, vec![0, 2], vec![0, 1], "reflect", None).unwrap();
        assert_eq!(reflect.to_vec().unwrap(), vec![3.0, 2.0, 1.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_negative_pads_crop() {
        let x = row(&[1.0, 2.0, 3.0, 4.0]);
        let out = run(&x, vec![0, -1], vec![0, 1], "reflect", None).unwrap();
        assert_eq!(out.to_vec().unwrap(), vec![2.0, 3.0, 4.0, 3.0]);
    }

    #[test]
    fn test_reflect_too_wide_rejected() {
        let x = row(&[1.0, 2.0]);
        assert!(run(&x, vec![0, 2], vec![0, 0], "reflect", None).is_err());
    }

    #[test]
    fn test_pad_count_must_match_rank() {
        let x = row(&[1.0]);
        assert!(run(&x, vec![1], vec![1], "constant", None).is_err());
    }

    #[test]
    fn test_int64_values_stay_exact() {
        let big = (1i64 << 53) + 1;
        let x = Tensor::from_i64(vec![big, -big], vec![1, 2]).unwrap();
        let out = run(&x, vec![0, 1], vec![0, 1], "edge", None).unwrap();
        assert_eq!(out.dtype(), DataType::I64);
        assert_eq!(out.to_vec_i64().unwrap(), vec![big, big, -big, -big]);

        let filled = run(&x, vec![0, 0], vec![0, 1], "constant", Some(3.0)).unwrap();
        assert_eq!(filled.to_vec_i64().unwrap(), vec![big, -big, 3]);
    }

    #[test]
    fn test_bool_pad_keeps_dtype() {
        let x = Tensor::from_i64(vec![1, 0], vec![1, 2]).unwrap().cast(DataType::Bool).unwrap();
        let out = run(&x, vec![0, 1], vec![0, 0], "edge", None).unwrap();
        assert_eq!(out.dtype(), DataType::Bool);
        assert_eq!(out.to_vec_i64().unwrap(), vec![1, 1, 0]);
    }

    #[test]
    fn test_unknown_mode() {
        assert!("circular".parse::<IrPadMode>().is_err());
    }
}
