//! Padding with the framework's `pad` semantics.
//!
//! A pad list is a flat sequence of `(begin, end)` pairs, the first pair
//! applying to the last dimension, the second to the one before it, and so
//! on. Dimensions without a pair are left untouched.

use crate::error::CoreError;
use crate::ops::shape::ShapeOps;
use crate::tensor::Tensor;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the padded region is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadMode {
    /// Fill with a constant value. Negative widths crop.
    Constant,
    /// Mirror around the edge without repeating it.
    Reflect,
    /// Repeat the edge element.
    Replicate,
    /// Wrap around. Negative widths crop before wrapping.
    Circular,
}

impl PadMode {
    /// Mode name as written in case tables.
    pub fn name(self) -> &'static str {
        match self {
            PadMode::Constant => "constant",
            PadMode::Reflect => "reflect",
            PadMode::Replicate => "replicate",
            PadMode::Circular => "circular",
        }
    }
}

impl fmt::Display for PadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PadMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(PadMode::Constant),
            "reflect" => Ok(PadMode::Reflect),
            "replicate" => Ok(PadMode::Replicate),
            "circular" => Ok(PadMode::Circular),
            other => Err(CoreError::UnsupportedPadMode(other.to_string())),
        }
    }
}

/// Expand a framework pad list into one `(begin, end)` pair per dimension.
pub fn expand_pads(pads: &[i64], rank: usize) -> Result<Vec<(i64, i64)>, CoreError> {
    if pads.len() % 2 != 0 {
        return Err(CoreError::InvalidPadding(format!(
            "pad list {pads:?} has odd length"
        )));
    }
    if pads.len() / 2 > rank {
        return Err(CoreError::InvalidPadding(format!(
            "pad list {pads:?} covers {} dimensions but the input has {rank}",
            pads.len() / 2
        )));
    }
    let mut per_dim = vec![(0, 0); rank];
    for (i, pair) in pads.chunks(2).enumerate() {
        per_dim[rank - 1 - i] = (pair[0], pair[1]);
    }
    Ok(per_dim)
}

/// Output size of one dimension after padding; errors if it would be negative.
pub fn padded_dim(size: usize, begin: i64, end: i64) -> Result<usize, CoreError> {
    let out = size as i64 + begin + end;
    if out < 0 {
        return Err(CoreError::InvalidPadding(format!(
            "pads ({begin}, {end}) shrink a dimension of size {size} below zero"
        )));
    }
    Ok(out as usize)
}

/// Source index for every output position of a non-constant mode along one
/// dimension of size `size`.
pub fn source_indices(
    mode: PadMode,
    size: usize,
    begin: i64,
    end: i64,
) -> Result<Vec<usize>, CoreError> {
    let n = size as i64;
    match mode {
        PadMode::Constant => Err(CoreError::InvalidPadding(
            "constant padding has no source index mapping".to_string(),
        )),
        PadMode::Reflect => {
            if begin < 0 || end < 0 || begin >= n || end >= n {
                return Err(CoreError::InvalidPadding(format!(
                    "reflect pads ({begin}, {end}) must be non-negative and smaller than {size}"
                )));
            }
            Ok((0..n + begin + end)
                .map(|j| {
                    let p = j - begin;
                    let idx = if p < 0 {
                        -p
                    } else if p >= n {
                        2 * (n - 1) - p
                    } else {
                        p
                    };
                    idx as usize
                })
                .collect())
        }
        PadMode::Replicate => {
            if begin < 0 || end < 0 || (n == 0 && begin + end > 0) {
                return Err(CoreError::InvalidPadding(format!(
                    "replicate pads ({begin}, {end}) are invalid for a dimension of size {size}"
                )));
            }
            Ok((0..n + begin + end)
                .map(|j| (j - begin).clamp(0, n - 1) as usize)
                .collect())
        }
        PadMode::Circular => {
            let crop_begin = (-begin).max(0);
            let crop_end = (-end).max(0);
            let body = n - crop_begin - crop_end;
            if body < 0 {
                return Err(CoreError::InvalidPadding(format!(
                    "circular pads ({begin}, {end}) crop more than the {size} available elements"
                )));
            }
            let left = begin.max(0);
            let right = end.max(0);
            if left > body || right > body || (body == 0 && left + right > 0) {
                return Err(CoreError::InvalidPadding(format!(
                    "circular pads ({begin}, {end}) wrap around more than once"
                )));
            }
            Ok((0..body + left + right)
                .map(|j| (crop_begin + (j - left).rem_euclid(body.max(1))) as usize)
                .collect())
        }
    }
}

/// Trait for padding tensors.
pub trait PadOps {
    /// Pad with a framework pad list. `value` is only used by constant mode.
    fn pad(&self, pads: &[i64], mode: PadMode, value: f64) -> Result<Tensor>;
}

impl PadOps for Tensor {
    fn pad(&self, pads: &[i64], mode: PadMode, value: f64) -> Result<Tensor> {
        let per_dim = expand_pads(pads, self.rank())?;
        let mut current = self.clone();
        for (dim, &(begin, end)) in per_dim.iter().enumerate() {
            if begin == 0 && end == 0 {
                continue;
            }
            current = match mode {
                PadMode::Constant => pad_constant_dim(&current, dim, begin, end, value)?,
                _ => {
                    let size = current.shape()[dim];
                    let indices = source_indices(mode, size, begin, end)?;
                    current.index_select(&indices, dim)?
                }
            };
        }
        Ok(current)
    }
}

fn pad_constant_dim(x: &Tensor, dim: usize, begin: i64, end: i64, value: f64) -> Result<Tensor> {
    let size = x.shape()[dim];
    padded_dim(size, begin, end)?;

    let crop_begin = (-begin).max(0) as usize;
    let crop_end = (-end).max(0) as usize;
    let body = x.narrow(dim, crop_begin, size - crop_begin - crop_end)?;

    let body_shape = body.shape();
    let fill = |width: i64| -> Result<Tensor> {
        let mut shape = body_shape.clone();
        shape[dim] = width as usize;
        Tensor::full(value, shape, x.dtype())
    };

    let mut parts = Vec::with_capacity(3);
    if begin > 0 {
        parts.push(fill(begin)?);
    }
    parts.push(body);
    if end > 0 {
        parts.push(fill(end)?);
    }
    let refs: Vec<&Tensor> = parts.iter().collect();
    Tensor::concat(&refs, dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn row(values: &[f32]) -> Tensor {
        Tensor::from_data(values.to_vec(), vec![values.len()], DataType::F32).unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("reflect".parse::<PadMode>().unwrap(), PadMode::Reflect);
        assert!("symmetric".parse::<PadMode>().is_err());
    }

    #[test]
    fn test_expand_pads_last_dim_first() {
        let per_dim = expand_pads(&[1, 2, 3, 4], 4).unwrap();
        assert_eq!(per_dim, vec![(0, 0), (0, 0), (3, 4), (1, 2)]);
        assert!(expand_pads(&[1, 2, 3], 4).is_err());
        assert!(expand_pads(&[1, 0, 0, 0, 0, 1], 2).is_err());
    }

    #[test]
    fn test_constant_pad_with_value() -> Result<()> {
        let out = row(&[1.0, 2.0]).pad(&[1, 2], PadMode::Constant, 9.0)?;
        assert_eq!(out.to_vec()?, vec![9.0, 1.0, 2.0, 9.0, 9.0]);
        Ok(())
    }

    #[test]
    fn test_constant_pad_both_sides_of_matrix() -> Result<()> {
        let x = Tensor::from_i64(vec![1, 2, 3, 4, 5, 6], vec![2, 3])?;
        let out = x.pad(&[1, 1, 1, 0], PadMode::Constant, 7.0)?;
        assert_eq!(out.shape(), vec![3, 5]);
        assert_eq!(out.dtype(), DataType::I64);
        assert_eq!(
            out.to_vec_i64()?,
            vec![7, 7, 7, 7, 7, 7, 1, 2, 3, 7, 7, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_constant_negative_crops() -> Result<()> {
        let out = row(&[1.0, 2.0, 3.0, 4.0]).pad(&[-1, 1], PadMode::Constant, 0.0)?;
        assert_eq!(out.to_vec()?, vec![2.0, 3.0, 4.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_reflect() -> Result<()> {
        let out = row(&[1.0, 2.0, 3.0, 4.0]).pad(&[2, 1], PadMode::Reflect, 0.0)?;
        assert_eq!(out.to_vec()?, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0]);
        assert!(row(&[1.0, 2.0]).pad(&[2, 0], PadMode::Reflect, 0.0).is_err());
        Ok(())
    }

    #[test]
    fn test_replicate() -> Result<()> {
        let out = row(&[1.0, 2.0, 3.0]).pad(&[2, 1], PadMode::Replicate, 0.0)?;
        assert_eq!(out.to_vec()?, vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_circular() -> Result<()> {
        let out = row(&[1.0, 2.0, 3.0, 4.0]).pad(&[1, 2], PadMode::Circular, 0.0)?;
        assert_eq!(out.to_vec()?, vec![4.0, 1.0, 2.0, 3.0, 4.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_circular_negative_crops_before_wrapping() -> Result<()> {
        let out = row(&[1.0, 2.0, 3.0, 4.0, 5.0]).pad(&[-1, 1], PadMode::Circular, 0.0)?;
        assert_eq!(out.to_vec()?, vec![2.0, 3.0, 4.0, 5.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_circular_wrapping_twice_rejected() {
        assert!(row(&[1.0, 2.0]).pad(&[3, 0], PadMode::Circular, 0.0).is_err());
    }

    #[test]
    fn test_two_dims() -> Result<()> {
        let x = Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2], DataType::F32)?;
        let out = x.pad(&[1, 0, 0, 1], PadMode::Constant, 0.0)?;
        assert_eq!(out.shape(), vec![3, 3]);
        assert_eq!(
            out.to_vec()?,
            vec![0.0, 1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0]
        );
        Ok(())
    }
}
