//! Reduction-based operations.

use crate::tensor::Tensor;
use anyhow::{anyhow, Result};

/// Trait for reductions along a dimension.
pub trait ReductionOps {
    /// Numerically stable softmax along `dim`.
    fn softmax(&self, dim: usize) -> Result<Tensor>;
}

impl ReductionOps for Tensor {
    fn softmax(&self, dim: usize) -> Result<Tensor> {
        if dim >= self.rank() {
            return Err(anyhow!(
                "Softmax dimension {} out of bounds for shape {:?}",
                dim,
                self.shape()
            ));
        }
        let x = self.candle_tensor();
        let max = x.max_keepdim(dim)?;
        let exp = x.broadcast_sub(&max)?.exp()?;
        let sum = exp.sum_keepdim(dim)?;
        let result = exp.broadcast_div(&sum)?;
        Ok(Tensor::from_candle(result, self.dtype()))
    }
}
