//! Two-dimensional matrix product, the building block of `addmm` and `Gemm`.

use crate::tensor::Tensor;
use anyhow::{bail, Result};

/// Matrix product on rank-2 tensors.
pub trait MatrixOps {
    /// `(n, k) x (k, m) -> (n, m)`. The result keeps the left operand's type.
    fn matmul(&self, other: &Tensor) -> Result<Tensor>;
}

impl MatrixOps for Tensor {
    fn matmul(&self, other: &Tensor) -> Result<Tensor> {
        let (lhs_shape, rhs_shape) = (self.shape(), other.shape());
        let (&[n, k], &[k2, m]) = (lhs_shape.as_slice(), rhs_shape.as_slice()) else {
            bail!("matmul expects two matrices, got {lhs_shape:?} and {rhs_shape:?}");
        };
        if k != k2 {
            bail!("matmul inner dimensions differ: ({n}, {k}) x ({k2}, {m})");
        }

        let product = self
            .candle_tensor()
            .contiguous()?
            .matmul(&other.candle_tensor().contiguous()?)?;
        Ok(Tensor::from_candle(product, self.dtype()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_matmul_rectangular() -> Result<()> {
        let a = Tensor::from_data((1..=6).map(|v| v as f32).collect(), vec![2, 3], DataType::F32)?;
        let b = Tensor::from_data((7..=12).map(|v| v as f32).collect(), vec![3, 2], DataType::F32)?;
        let c = a.matmul(&b)?;
        assert_eq!(c.shape(), vec![2, 2]);
        assert_eq!(c.to_vec()?, vec![58.0, 64.0, 139.0, 154.0]);
        Ok(())
    }

    #[test]
    fn test_matmul_rejects_inner_mismatch() -> Result<()> {
        let a = Tensor::zeros(vec![2, 3], DataType::F32)?;
        assert!(a.matmul(&a).is_err());
        Ok(())
    }

    #[test]
    fn test_matmul_rejects_vectors() -> Result<()> {
        let v = Tensor::zeros(vec![3], DataType::F32)?;
        let m = Tensor::zeros(vec![3, 1], DataType::F32)?;
        assert!(v.matmul(&m).is_err());
        Ok(())
    }

    #[test]
    fn test_matmul_half_precision_keeps_dtype() -> Result<()> {
        let a = Tensor::from_data(vec![1.0, 2.0], vec![1, 2], DataType::F16)?;
        let b = Tensor::from_data(vec![3.0, 4.0], vec![2, 1], DataType::F16)?;
        let c = a.matmul(&b)?;
        assert_eq!(c.dtype(), DataType::F16);
        assert_eq!(c.to_vec()?, vec![11.0]);
        Ok(())
    }
}
