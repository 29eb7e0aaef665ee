//! Views and rearrangements: the pieces padding and the IR slicing ops are built from.
//!
//! Reshape, flatten, slicing, concatenation, gathering along an axis,
//! reversal and broadcasting.

use crate::tensor::Tensor;
use anyhow::{anyhow, bail, Result};
use candle_core::{Device, Tensor as CandleTensor};

/// Shape-changing operations.
pub trait ShapeOps {
    /// Same elements, new dimensions.
    fn reshape(&self, new_shape: &[usize]) -> Result<Tensor>;

    /// Reshape with at most one `-1` entry, which is inferred.
    fn reshape_inferred(&self, new_shape: &[i64]) -> Result<Tensor>;

    /// Flatten dimensions `start_dim..` into one.
    fn flatten_from(&self, start_dim: usize) -> Result<Tensor>;

    /// Take `len` elements starting at `start` along `dim`.
    fn narrow(&self, dim: usize, start: usize, len: usize) -> Result<Tensor>;

    /// Select the given indices along `dim`.
    fn index_select(&self, indices: &[usize], dim: usize) -> Result<Tensor>;

    /// Reverse the order of elements along `dim`.
    fn reverse(&self, dim: usize) -> Result<Tensor>;

    /// Broadcast to a target shape.
    fn broadcast_to(&self, shape: &[usize]) -> Result<Tensor>;
}

impl Tensor {
    /// Concatenate tensors along an axis.
    pub fn concat(tensors: &[&Tensor], dim: usize) -> Result<Tensor> {
        let Some(first) = tensors.first() else {
            bail!("nothing to concatenate");
        };
        let parts: Vec<&CandleTensor> = tensors.iter().map(|t| t.candle_tensor()).collect();
        Ok(Tensor::from_candle(CandleTensor::cat(&parts, dim)?, first.dtype()))
    }
}

fn axis_len(t: &Tensor, dim: usize) -> Result<usize> {
    t.shape()
        .get(dim)
        .copied()
        .ok_or_else(|| anyhow!("axis {dim} out of range for rank-{} tensor", t.rank()))
}

impl ShapeOps for Tensor {
    fn reshape(&self, new_shape: &[usize]) -> Result<Tensor> {
        let wanted: usize = new_shape.iter().product();
        if wanted != self.numel() {
            bail!(
                "cannot view {:?} ({} elements) as {new_shape:?} ({wanted} elements)",
                self.shape(),
                self.numel()
            );
        }
        let viewed = self.candle_tensor().reshape(new_shape)?;
        Ok(Tensor::from_candle(viewed, self.dtype()))
    }

    fn reshape_inferred(&self, new_shape: &[i64]) -> Result<Tensor> {
        let mut hole = None;
        let mut known = 1usize;
        for (i, &d) in new_shape.iter().enumerate() {
            match usize::try_from(d) {
                Ok(d) => known *= d,
                Err(_) if hole.is_none() => hole = Some(i),
                Err(_) => bail!("at most one inferred axis allowed in {new_shape:?}"),
            }
        }
        let mut resolved: Vec<usize> = new_shape.iter().map(|&d| d.max(0) as usize).collect();
        if let Some(i) = hole {
            resolved[i] = self.numel().checked_div(known).unwrap_or(0);
        }
        self.reshape(&resolved)
    }

    fn flatten_from(&self, start_dim: usize) -> Result<Tensor> {
        axis_len(self, start_dim)?;
        let shape = self.shape();
        let (outer, inner) = shape.split_at(start_dim);
        let mut flat = outer.to_vec();
        flat.push(inner.iter().product());
        self.reshape(&flat)
    }

    fn narrow(&self, dim: usize, start: usize, len: usize) -> Result<Tensor> {
        let size = axis_len(self, dim)?;
        if start + len > size {
            bail!("slice {start}..{} exceeds axis {dim} of size {size}", start + len);
        }
        let result = self.candle_tensor().narrow(dim, start, len)?;
        Ok(Tensor::from_candle(result, self.dtype()))
    }

    fn index_select(&self, indices: &[usize], dim: usize) -> Result<Tensor> {
        let size = axis_len(self, dim)?;
        if let Some(bad) = indices.iter().find(|&&i| i >= size) {
            bail!("index {bad} exceeds axis {dim} of size {size}");
        }
        let ids: Vec<u32> = indices.iter().map(|&i| i as u32).collect();
        let ids = CandleTensor::from_vec(ids, indices.len(), &Device::Cpu)?;
        let result = self
            .candle_tensor()
            .contiguous()?
            .index_select(&ids, dim)?;
        Ok(Tensor::from_candle(result, self.dtype()))
    }

    fn reverse(&self, dim: usize) -> Result<Tensor> {
        let indices: Vec<usize> = (0..axis_len(self, dim)?).rev().collect();
        self.index_select(&indices, dim)
    }

    fn broadcast_to(&self, shape: &[usize]) -> Result<Tensor> {
        let result = self.candle_tensor().broadcast_as(shape)?.contiguous()?;
        Ok(Tensor::from_candle(result, self.dtype()))
    }
}
