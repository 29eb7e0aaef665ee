//! Element-wise arithmetic with numpy broadcasting.
//!
//! The result takes the left operand's logical type.

use crate::tensor::Tensor;
use crate::types::DataType;
use anyhow::{bail, Result};
use candle_core::Tensor as CandleTensor;

/// Broadcasting binary arithmetic.
pub trait ArithmeticOps {
    /// `self + other`.
    fn add(&self, other: &Tensor) -> Result<Tensor>;

    /// `self - other`.
    fn sub(&self, other: &Tensor) -> Result<Tensor>;

    /// `self * other`.
    fn mul(&self, other: &Tensor) -> Result<Tensor>;

    /// `self / other`; floor division when both sides are integers.
    fn div(&self, other: &Tensor) -> Result<Tensor>;

    /// Every element times `scalar`.
    fn mul_scalar(&self, scalar: f64) -> Result<Tensor>;

    /// Round toward negative infinity. Integer tensors are returned as is.
    fn floor(&self) -> Result<Tensor>;
}

type Binary = fn(&CandleTensor, &CandleTensor) -> candle_core::Result<CandleTensor>;

fn zip_with(lhs: &Tensor, rhs: &Tensor, op: Binary) -> Result<Tensor> {
    if !lhs.is_broadcastable_with(rhs) {
        bail!(
            "operands {:?} and {:?} do not broadcast",
            lhs.shape(),
            rhs.shape()
        );
    }
    Ok(Tensor::from_candle(
        op(lhs.candle_tensor(), rhs.candle_tensor())?,
        lhs.dtype(),
    ))
}

impl ArithmeticOps for Tensor {
    fn add(&self, other: &Tensor) -> Result<Tensor> {
        zip_with(self, other, CandleTensor::broadcast_add)
    }

    fn sub(&self, other: &Tensor) -> Result<Tensor> {
        zip_with(self, other, CandleTensor::broadcast_sub)
    }

    fn mul(&self, other: &Tensor) -> Result<Tensor> {
        zip_with(self, other, CandleTensor::broadcast_mul)
    }

    fn div(&self, other: &Tensor) -> Result<Tensor> {
        if !(self.dtype().is_integer() && other.dtype().is_integer()) {
            return zip_with(self, other, CandleTensor::broadcast_div);
        }
        // i64 storage truncates toward zero; floor on f64 instead.
        let quotient = zip_with(
            &self.cast(DataType::F64)?,
            &other.cast(DataType::F64)?,
            CandleTensor::broadcast_div,
        )?;
        quotient.floor()?.cast(self.dtype())
    }

    fn mul_scalar(&self, scalar: f64) -> Result<Tensor> {
        Ok(Tensor::from_candle(
            self.candle_tensor().affine(scalar, 0.0)?,
            self.dtype(),
        ))
    }

    fn floor(&self) -> Result<Tensor> {
        if !self.dtype().is_float() {
            return Ok(self.clone());
        }
        Ok(Tensor::from_candle(self.candle_tensor().floor()?, self.dtype()))
    }
}
