//! Eager kernels with the framework's operator semantics.
//!
//! These are the reference: modules call them directly in `forward`, and the
//! tracer calls them (through the kernel table) while it records a graph.

use crate::error::{FrontendError, Result};
use opcheck_core::{
    ArithmeticOps, DataType, MatrixOps, PadMode, PadOps, ReductionOps, ShapeOps, Tensor,
};

/// `F.pad(x, pads, mode, value)`; `value` defaults to zero.
pub fn pad(x: &Tensor, pads: &[i64], mode: PadMode, value: Option<f64>) -> Result<Tensor> {
    Ok(x.pad(pads, mode, value.unwrap_or(0.0))?)
}

/// `torch.addmm(input, m1, m2, beta, alpha)`.
///
/// With `beta == 0` the input is not read at all, so NaN or Inf in it never
/// reaches the result.
pub fn addmm(input: &Tensor, m1: &Tensor, m2: &Tensor, beta: f64, alpha: f64) -> Result<Tensor> {
    if m1.rank() != 2 || m2.rank() != 2 {
        return Err(FrontendError::InvalidAttribute {
            name: "mat1".to_string(),
            reason: format!(
                "addmm expects 2-D matrices, got {:?} and {:?}",
                m1.shape(),
                m2.shape()
            ),
        });
    }
    let product = m1.matmul(m2)?;
    let product = if alpha == 1.0 {
        product
    } else {
        product.mul_scalar(alpha)?
    };

    let out_shape = product.shape();
    if Tensor::broadcast_shape(&input.shape(), &out_shape)? != out_shape {
        return Err(FrontendError::InvalidAttribute {
            name: "input".to_string(),
            reason: format!(
                "shape {:?} does not broadcast to {:?}",
                input.shape(),
                out_shape
            ),
        });
    }

    if beta == 0.0 {
        return Ok(product);
    }
    let bias = if beta == 1.0 {
        input.clone()
    } else {
        input.mul_scalar(beta)?
    };
    Ok(bias.add(&product)?.broadcast_to(&out_shape)?)
}

/// A tensor shaped like `x` with every element `value`, of `dtype` or `x`'s type.
pub fn full_like(x: &Tensor, value: f64, dtype: Option<DataType>) -> Result<Tensor> {
    Ok(Tensor::full(value, x.shape(), dtype.unwrap_or(x.dtype()))?)
}

/// Element type conversion.
pub fn cast(x: &Tensor, dtype: DataType) -> Result<Tensor> {
    Ok(x.cast(dtype)?)
}

/// `a // b`, rounding toward negative infinity for every element type.
pub fn floor_divide(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    Ok(a.div(b)?.floor()?)
}

/// `a - alpha * b`.
pub fn sub(a: &Tensor, b: &Tensor, alpha: f64) -> Result<Tensor> {
    if alpha == 1.0 {
        return Ok(a.sub(b)?);
    }
    Ok(a.sub(&b.mul_scalar(alpha)?)?)
}

/// Pack integer scalars into a 1-D `int64` list.
pub fn list_construct(items: &[&Tensor]) -> Result<Tensor> {
    let values = items
        .iter()
        .map(|t| t.scalar_i64())
        .collect::<anyhow::Result<Vec<i64>>>()?;
    let len = values.len();
    Ok(Tensor::from_i64(values, vec![len])?)
}

/// Merge dimensions `start_dim..` into one.
pub fn flatten(x: &Tensor, start_dim: i64) -> Result<Tensor> {
    let start = resolve_dim(start_dim, x.rank())?;
    Ok(x.flatten_from(start)?)
}

/// Softmax over `dim` (negative counts from the end).
pub fn softmax(x: &Tensor, dim: i64) -> Result<Tensor> {
    let dim = resolve_dim(dim, x.rank())?;
    Ok(x.softmax(dim)?)
}

fn resolve_dim(dim: i64, rank: usize) -> Result<usize> {
    let resolved = if dim < 0 { dim + rank as i64 } else { dim };
    if resolved < 0 || resolved >= rank as i64 {
        return Err(FrontendError::InvalidAttribute {
            name: "dim".to_string(),
            reason: format!("dimension {dim} out of range for rank {rank}"),
        });
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(values: &[f32], rows: usize, cols: usize) -> Tensor {
        Tensor::from_data(values.to_vec(), vec![rows, cols], DataType::F32).unwrap()
    }

    #[test]
    fn test_addmm_combines_terms() {
        let input = matrix(&[1.0, 1.0], 1, 2);
        let m1 = matrix(&[1.0, 2.0], 1, 2);
        let m2 = matrix(&[1.0, 0.0, 0.0, 1.0], 2, 2);
        let out = addmm(&input, &m1, &m2, 2.0, 3.0).unwrap();
        assert_eq!(out.to_vec().unwrap(), vec![5.0, 8.0]);
    }

    #[test]
    fn test_addmm_beta_zero_ignores_nan() {
        let input = matrix(&[f32::NAN, f32::INFINITY], 1, 2);
        let m1 = matrix(&[1.0, 2.0], 1, 2);
        let m2 = matrix(&[1.0, 0.0, 0.0, 1.0], 2, 2);
        let out = addmm(&input, &m1, &m2, 0.0, 1.0).unwrap();
        assert_eq!(out.to_vec().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_addmm_broadcasts_column_input() {
        let input = matrix(&[1.0, 2.0], 2, 1);
        let m1 = matrix(&[1.0, 1.0], 2, 1);
        let m2 = matrix(&[1.0, 1.0, 1.0], 1, 3);
        let out = addmm(&input, &m1, &m2, 1.0, 1.0).unwrap();
        assert_eq!(out.shape(), vec![2, 3]);
        assert_eq!(out.to_vec().unwrap(), vec![2.0, 2.0, 2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_floor_divide_negative_ints() {
        let a = Tensor::from_i32(vec![-5], vec![]).unwrap();
        let b = Tensor::from_i32(vec![2], vec![]).unwrap();
        assert_eq!(floor_divide(&a, &b).unwrap().scalar_i64().unwrap(), -3);
    }

    #[test]
    fn test_floor_divide_floats_round_down() {
        let a = Tensor::from_data(vec![-5.0, 5.0], vec![2], DataType::F32).unwrap();
        let b = Tensor::from_data(vec![2.0], vec![1], DataType::F32).unwrap();
        let out = floor_divide(&a, &b).unwrap();
        assert_eq!(out.dtype(), DataType::F32);
        assert_eq!(out.to_vec().unwrap(), vec![-3.0, 2.0]);
    }

    #[test]
    fn test_list_construct() {
        let a = Tensor::from_i32(vec![3], vec![]).unwrap();
        let b = Tensor::from_i32(vec![4], vec![]).unwrap();
        let list = list_construct(&[&a, &b]).unwrap();
        assert_eq!(list.dtype(), DataType::I64);
        assert_eq!(list.to_vec_i64().unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_full_like_keeps_dtype_by_default() {
        let x = Tensor::zeros(vec![2, 2], DataType::F16).unwrap();
        let out = full_like(&x, 1.0, None).unwrap();
        assert_eq!(out.dtype(), DataType::F16);
        assert_eq!(out.shape(), vec![2, 2]);
    }

    #[test]
    fn test_flatten_and_softmax_dims() {
        let x = Tensor::zeros(vec![1, 2, 3], DataType::F32).unwrap();
        assert_eq!(flatten(&x, 1).unwrap().shape(), vec![1, 6]);
        assert!(softmax(&x, 3).is_err());
        assert_eq!(softmax(&x, -1).unwrap().shape(), vec![1, 2, 3]);
    }
}
