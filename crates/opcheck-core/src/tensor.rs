//! Candle-backed tensors carrying a logical element type.
//!
//! A [`Tensor`] couples a Candle tensor with the logical [`DataType`] the
//! harness reasons about. Candle has fewer element types than the frameworks
//! being mirrored, so every integer width is held as Candle `i64` and bools
//! as `u8`; the logical type travels alongside and is restored on export.

use crate::error::CoreError;
use crate::types::{DataType, TensorData, TensorSpec};
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Shape, Tensor as CandleTensor};
use std::path::Path;

/// A Candle tensor plus the element type callers see.
#[derive(Debug, Clone)]
pub struct Tensor {
    candle_tensor: CandleTensor,
    dtype: DataType,
}

impl Tensor {
    /// Create a new tensor from raw `f32` data, converting to `dtype`.
    ///
    /// # Example
    /// ```rust
    /// use opcheck_core::{DataType, Tensor};
    ///
    /// let tensor = Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2], DataType::F32)?;
    /// assert_eq!(tensor.shape(), vec![2, 2]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_data(data: Vec<f32>, shape: Vec<usize>, dtype: DataType) -> Result<Self> {
        check_len(data.len(), &shape)?;
        let base = CandleTensor::from_vec(data, Shape::from_dims(&shape), &Device::Cpu)?;
        Self::from_candle(base, DataType::F32).cast(dtype)
    }

    /// Create a tensor from `f64` data, converting to `dtype`.
    pub fn from_f64(data: Vec<f64>, shape: Vec<usize>, dtype: DataType) -> Result<Self> {
        check_len(data.len(), &shape)?;
        let base = CandleTensor::from_vec(data, Shape::from_dims(&shape), &Device::Cpu)?;
        Self::from_candle(base, DataType::F64).cast(dtype)
    }

    /// Create an INT64 tensor from raw i64 data.
    pub fn from_i64(data: Vec<i64>, shape: Vec<usize>) -> Result<Self> {
        check_len(data.len(), &shape)?;
        let candle_tensor = CandleTensor::from_vec(data, Shape::from_dims(&shape), &Device::Cpu)?;
        Ok(Self {
            candle_tensor,
            dtype: DataType::I64,
        })
    }

    /// Create an INT32 tensor from raw i32 data.
    pub fn from_i32(data: Vec<i32>, shape: Vec<usize>) -> Result<Self> {
        let widened = data.into_iter().map(i64::from).collect();
        let mut tensor = Self::from_i64(widened, shape)?;
        tensor.dtype = DataType::I32;
        Ok(tensor)
    }

    /// Create a BOOL tensor.
    pub fn from_bool(data: Vec<bool>, shape: Vec<usize>) -> Result<Self> {
        check_len(data.len(), &shape)?;
        let bytes: Vec<u8> = data.into_iter().map(u8::from).collect();
        let candle_tensor = CandleTensor::from_vec(bytes, Shape::from_dims(&shape), &Device::Cpu)?;
        Ok(Self {
            candle_tensor,
            dtype: DataType::Bool,
        })
    }

    /// Zero-filled tensor.
    pub fn zeros(shape: Vec<usize>, dtype: DataType) -> Result<Self> {
        let candle_tensor =
            CandleTensor::zeros(Shape::from_dims(&shape), dtype_to_candle(dtype), &Device::Cpu)?;
        Ok(Self {
            candle_tensor,
            dtype,
        })
    }

    /// Create a tensor where every element is `value` converted to `dtype`.
    pub fn full(value: f64, shape: Vec<usize>, dtype: DataType) -> Result<Self> {
        let base = CandleTensor::full(value, Shape::from_dims(&shape), &Device::Cpu)?;
        Self::from_candle(base, DataType::F64).cast(dtype)
    }

    /// Create a tensor from a serialized payload.
    pub fn from_tensor_data(data: &TensorData) -> Result<Self> {
        Self::from_f64(data.values.clone(), data.shape.clone(), data.dtype)
    }

    /// Dimensions, outermost first.
    pub fn shape(&self) -> Vec<usize> {
        self.candle_tensor.dims().to_vec()
    }

    /// Logical element type.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Shape and data type without the data.
    pub fn spec(&self) -> TensorSpec {
        TensorSpec::new(self.dtype, self.shape())
    }

    /// Number of dimensions; 0 for scalars.
    pub fn rank(&self) -> usize {
        self.candle_tensor.rank()
    }

    /// Element count.
    pub fn numel(&self) -> usize {
        self.candle_tensor.elem_count()
    }

    /// Extract data as a flat vector of f32 values.
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        let flat = self.candle_tensor.flatten_all()?.to_dtype(DType::F32)?;
        Ok(flat.to_vec1::<f32>()?)
    }

    /// Extract data as a flat vector of f64 values.
    pub fn to_vec_f64(&self) -> Result<Vec<f64>> {
        let flat = self.candle_tensor.flatten_all()?.to_dtype(DType::F64)?;
        Ok(flat.to_vec1::<f64>()?)
    }

    /// Extract data as a flat vector of i64 values (floats truncate).
    pub fn to_vec_i64(&self) -> Result<Vec<i64>> {
        let flat = self.candle_tensor.flatten_all()?.to_dtype(DType::I64)?;
        Ok(flat.to_vec1::<i64>()?)
    }

    /// Read a single-element tensor as an integer.
    pub fn scalar_i64(&self) -> Result<i64> {
        match self.to_vec_i64()?.as_slice() {
            [value] => Ok(*value),
            other => Err(anyhow!(
                "Expected a single-element tensor, got {} elements",
                other.len()
            )),
        }
    }

    /// Serialize into a [`TensorData`] payload.
    pub fn to_tensor_data(&self) -> Result<TensorData> {
        Ok(TensorData {
            dtype: self.dtype,
            shape: self.shape(),
            values: self.to_vec_f64()?,
        })
    }

    /// Backing Candle tensor.
    pub fn candle_tensor(&self) -> &CandleTensor {
        &self.candle_tensor
    }

    /// Wrap a Candle tensor without converting its storage.
    pub fn from_candle(candle_tensor: CandleTensor, dtype: DataType) -> Self {
        Self {
            candle_tensor,
            dtype,
        }
    }

    /// Cast to a different logical data type.
    ///
    /// Conversion to `Bool` maps every non-zero element to `true`; float to
    /// integer conversion truncates toward zero.
    pub fn cast(&self, to: DataType) -> Result<Self> {
        if to == DataType::Bool {
            if self.dtype == DataType::Bool {
                return Ok(self.clone());
            }
            let zeros = self.candle_tensor.zeros_like()?;
            let mask = self.candle_tensor.ne(&zeros)?;
            return Ok(Self::from_candle(mask, DataType::Bool));
        }
        let target = dtype_to_candle(to);
        let candle_tensor = if self.candle_tensor.dtype() == target {
            self.candle_tensor.clone()
        } else {
            self.candle_tensor.to_dtype(target)?
        };
        Ok(Self::from_candle(candle_tensor, to))
    }

    /// Whether numpy-style broadcasting can combine the two shapes.
    pub fn is_broadcastable_with(&self, other: &Tensor) -> bool {
        Self::broadcast_shape(&self.shape(), &other.shape()).is_ok()
    }

    /// Numpy-style broadcast of two shapes, aligned from the trailing dimension.
    pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
        let rank = lhs.len().max(rhs.len());
        let dim = |shape: &[usize], i: usize| {
            (i + shape.len())
                .checked_sub(rank)
                .map_or(1, |j| shape[j])
        };
        (0..rank)
            .map(|i| match (dim(lhs, i), dim(rhs, i)) {
                (a, b) if a == b || b == 1 => Ok(a),
                (1, b) => Ok(b),
                (a, b) => Err(anyhow!("shapes {lhs:?} and {rhs:?} do not broadcast ({a} vs {b})")),
            })
            .collect()
    }

    /// Write the tensor as a `.npy` file.
    pub fn write_npy<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.candle_tensor.write_npy(path)?;
        Ok(())
    }

    /// Read a `.npy` file, relabelling it with the logical type `dtype`.
    pub fn read_npy<P: AsRef<Path>>(path: P, dtype: DataType) -> Result<Self> {
        let raw = CandleTensor::read_npy(path)?;
        let candle_tensor = raw.to_dtype(dtype_to_candle(dtype))?;
        Ok(Self::from_candle(candle_tensor, dtype))
    }
}

/// Candle storage type used for a logical data type.
pub fn dtype_to_candle(dtype: DataType) -> DType {
    match dtype {
        DataType::F32 => DType::F32,
        DataType::F16 => DType::F16,
        DataType::BF16 => DType::BF16,
        DataType::F64 => DType::F64,
        DataType::I16 | DataType::I32 | DataType::I64 => DType::I64,
        DataType::U8 | DataType::Bool => DType::U8,
    }
}

fn check_len(len: usize, shape: &[usize]) -> Result<()> {
    let expected: usize = shape.iter().product();
    if len != expected {
        return Err(CoreError::InvalidShape {
            shape: shape.to_vec(),
            reason: format!("{len} values supplied for {expected} elements"),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_creation() -> Result<()> {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let tensor = Tensor::from_data(data.clone(), vec![2, 2], DataType::F32)?;

        assert_eq!(tensor.shape(), vec![2, 2]);
        assert_eq!(tensor.dtype(), DataType::F32);
        assert_eq!(tensor.numel(), 4);
        assert_eq!(tensor.to_vec()?, data);
        Ok(())
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(Tensor::from_data(vec![1.0, 2.0, 3.0], vec![2, 2], DataType::F32).is_err());
    }

    #[test]
    fn test_full_and_integer_labels() -> Result<()> {
        let tensor = Tensor::full(2.0, vec![3, 2], DataType::I32)?;
        assert_eq!(tensor.dtype(), DataType::I32);
        assert_eq!(tensor.to_vec_i64()?, vec![2; 6]);
        Ok(())
    }

    #[test]
    fn test_cast_to_bool_maps_nonzero() -> Result<()> {
        let tensor = Tensor::from_data(vec![0.0, 1.2, -3.0, 0.0], vec![4], DataType::F32)?;
        let mask = tensor.cast(DataType::Bool)?;
        assert_eq!(mask.dtype(), DataType::Bool);
        assert_eq!(mask.to_vec()?, vec![0.0, 1.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_cast_float_to_int_truncates() -> Result<()> {
        let tensor = Tensor::from_data(vec![1.2, 2.9, -1.5], vec![3], DataType::F32)?;
        assert_eq!(tensor.cast(DataType::I64)?.to_vec_i64()?, vec![1, 2, -1]);
        Ok(())
    }

    #[test]
    fn test_data_type_conversions() -> Result<()> {
        let data = vec![1.5, 2.5, 3.5, 4.5];
        let tensor_f16 = Tensor::from_data(data.clone(), vec![2, 2], DataType::F16)?;
        for (original, extracted) in data.iter().zip(tensor_f16.to_vec()?.iter()) {
            assert!((original - extracted).abs() < 0.01);
        }
        Ok(())
    }

    #[test]
    fn test_scalar_tensor() -> Result<()> {
        let scalar = Tensor::from_i32(vec![5], vec![])?;
        assert_eq!(scalar.rank(), 0);
        assert_eq!(scalar.scalar_i64()?, 5);
        Ok(())
    }

    #[test]
    fn test_tensor_data_roundtrip() -> Result<()> {
        let tensor = Tensor::from_bool(vec![true, false, true], vec![3])?;
        let restored = Tensor::from_tensor_data(&tensor.to_tensor_data()?)?;
        assert_eq!(restored.dtype(), DataType::Bool);
        assert_eq!(restored.to_vec()?, vec![1.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_broadcast_shapes() -> Result<()> {
        assert_eq!(Tensor::broadcast_shape(&[3, 1], &[1, 4])?, vec![3, 4]);
        assert_eq!(Tensor::broadcast_shape(&[1, 20], &[5, 20])?, vec![5, 20]);
        assert_eq!(Tensor::broadcast_shape(&[2, 3, 1], &[4])?, vec![2, 3, 4]);
        assert_eq!(Tensor::broadcast_shape(&[], &[2])?, vec![2]);
        assert!(Tensor::broadcast_shape(&[3, 2], &[2, 3]).is_err());
        Ok(())
    }

    #[test]
    fn test_zeros_keep_integer_label() -> Result<()> {
        let tensor = Tensor::zeros(vec![2, 2], DataType::I16)?;
        assert_eq!(tensor.dtype(), DataType::I16);
        assert_eq!(tensor.to_vec_i64()?, vec![0; 4]);
        Ok(())
    }
}
