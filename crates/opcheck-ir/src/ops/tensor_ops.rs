use super::{expect_inputs, int_attr, ints_attr, normalize_axis, IrOperator, Result};
use crate::error::IrError;
use opcheck_core::{NodeAttribute, ShapeOps, Tensor};
use std::collections::HashMap;

/// Reshape: data plus a 1-D i64 target shape, one entry may be -1
pub struct ReshapeOp;

impl IrOperator for ReshapeOp {
    fn op_type(&self) -> &str {
        "Reshape"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        _attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Reshape", inputs, 2, 2)?;
        let target = inputs[1].to_vec_i64()?;
        Ok(vec![inputs[0].reshape_inferred(&target)?])
    }
}

/// Concat: join tensors of one element type along `axis`
pub struct ConcatOp;

impl IrOperator for ConcatOp {
    fn op_type(&self) -> &str {
        "Concat"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        if inputs.is_empty() {
            return Err(IrError::InvalidGraph(
                "Concat requires at least 1 input".to_string(),
            ));
        }
        let dtype = inputs[0].dtype();
        if inputs.iter().any(|t| t.dtype() != dtype) {
            return Err(IrError::InvalidGraph(
                "Concat inputs have different element types".to_string(),
            ));
        }

        let axis = int_attr(attributes, "axis")?.unwrap_or(0);
        let axis = normalize_axis(axis, inputs[0].rank())?;
        Ok(vec![Tensor::concat(inputs, axis)?])
    }
}

/// Slice: unit-step slicing with python-style negative and out-of-range bounds
pub struct SliceOp;

impl SliceOp {
    fn resolve(bound: i64, dim: usize) -> usize {
        let dim_i = dim as i64;
        let resolved = if bound < 0 { bound + dim_i } else { bound };
        resolved.clamp(0, dim_i) as usize
    }
}

impl IrOperator for SliceOp {
    fn op_type(&self) -> &str {
        "Slice"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Slice", inputs, 1, 1)?;
        let starts = ints_attr(attributes, "starts")?;
        let ends = ints_attr(attributes, "ends")?;
        let axes = ints_attr(attributes, "axes")?;
        if starts.len() != ends.len() || starts.len() != axes.len() {
            return Err(IrError::InvalidAttribute {
                name: "starts".to_string(),
                reason: "starts, ends and axes must have equal length".to_string(),
            });
        }

        let mut result = inputs[0].clone();
        let shape = result.shape();
        for ((&start, &end), &axis) in starts.iter().zip(ends).zip(axes) {
            let axis = normalize_axis(axis, shape.len())?;
            let dim = shape[axis];
            let begin = Self::resolve(start, dim);
            let finish = Self::resolve(end, dim).max(begin);
            result = result.narrow(axis, begin, finish - begin)?;
        }
        Ok(vec![result])
    }
}

/// Gather: select entries of `axis` by an i64 index tensor
pub struct GatherOp;

impl IrOperator for GatherOp {
    fn op_type(&self) -> &str {
        "Gather"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Gather", inputs, 2, 2)?;
        let data = inputs[0];
        let indices = inputs[1];
        if indices.rank() > 1 {
            return Err(IrError::InvalidGraph(format!(
                "Gather supports scalar or 1-D indices, got rank {}",
                indices.rank()
            )));
        }

        let axis = int_attr(attributes, "axis")?.unwrap_or(0);
        let axis = normalize_axis(axis, data.rank())?;
        let dim = data.shape()[axis] as i64;

        let positions = indices
            .to_vec_i64()?
            .into_iter()
            .map(|i| {
                let resolved = if i < 0 { i + dim } else { i };
                if resolved < 0 || resolved >= dim {
                    Err(IrError::InvalidInput(format!(
                        "Gather index {i} out of range for dimension of size {dim}"
                    )))
                } else {
                    Ok(resolved as usize)
                }
            })
            .collect::<Result<Vec<usize>>>()?;

        let gathered = data.index_select(&positions, axis)?;
        if indices.rank() == 0 {
            let mut squeezed = gathered.shape();
            squeezed.remove(axis);
            return Ok(vec![gathered.reshape(&squeezed)?]);
        }
        Ok(vec![gathered])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcheck_core::DataType;

    fn arange(shape: Vec<usize>) -> Tensor {
        let n: usize = shape.iter().product();
        Tensor::from_data((0..n).map(|i| i as f32).collect(), shape, DataType::F32).unwrap()
    }

    fn slice_attrs(starts: Vec<i64>, ends: Vec<i64>, axes: Vec<i64>) -> HashMap<String, NodeAttribute> {
        let mut attrs = HashMap::new();
        attrs.insert("starts".to_string(), NodeAttribute::IntArray(starts));
        attrs.insert("ends".to_string(), NodeAttribute::IntArray(ends));
        attrs.insert("axes".to_string(), NodeAttribute::IntArray(axes));
        attrs
    }

    #[test]
    fn test_slice_negative_bounds() {
        let x = arange(vec![2, 5]);
        let attrs = slice_attrs(vec![-2], vec![i64::MAX], vec![1]);
        let out = SliceOp.execute(&[&x], &attrs).unwrap();
        assert_eq!(out[0].shape(), vec![2, 2]);
        assert_eq!(out[0].to_vec().unwrap(), vec![3.0, 4.0, 8.0, 9.0]);
    }

    #[test]
    fn test_slice_crops_both_ends() {
        let x = arange(vec![6]);
        let attrs = slice_attrs(vec![1], vec![-2], vec![0]);
        let out = SliceOp.execute(&[&x], &attrs).unwrap();
        assert_eq!(out[0].to_vec().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_gather_scalar_index_drops_axis() {
        let x = arange(vec![3, 2]);
        let idx = Tensor::from_i64(vec![-1], vec![]).unwrap();
        let mut attrs = HashMap::new();
        attrs.insert("axis".to_string(), NodeAttribute::Int(0));
        let out = GatherOp.execute(&[&x, &idx], &attrs).unwrap();
        assert_eq!(out[0].shape(), vec![2]);
        assert_eq!(out[0].to_vec().unwrap(), vec![4.0, 5.0]);
    }

    #[test]
    fn test_gather_out_of_range() {
        let x = arange(vec![3]);
        let idx = Tensor::from_i64(vec![3], vec![1]).unwrap();
        assert!(GatherOp.execute(&[&x, &idx], &HashMap::new()).is_err());
    }

    #[test]
    fn test_reshape_with_inferred_dim() {
        let x = arange(vec![2, 3, 4]);
        let shape = Tensor::from_i64(vec![2, -1], vec![2]).unwrap();
        let out = ReshapeOp.execute(&[&x, &shape], &HashMap::new()).unwrap();
        assert_eq!(out[0].shape(), vec![2, 12]);
    }

    #[test]
    fn test_concat_rejects_mixed_types() {
        let a = arange(vec![2]);
        let b = Tensor::from_i64(vec![1, 2], vec![2]).unwrap();
        assert!(ConcatOp.execute(&[&a, &b], &HashMap::new()).is_err());
    }
}
