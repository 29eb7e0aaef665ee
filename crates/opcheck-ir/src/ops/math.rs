use super::{expect_inputs, int_attr, normalize_axis, IrOperator, Result};
use crate::error::IrError;
use opcheck_core::{ArithmeticOps, MatrixOps, NodeAttribute, ReductionOps, Tensor};
use std::collections::HashMap;

fn check_same_type(op_type: &str, lhs: &Tensor, rhs: &Tensor) -> Result<()> {
    if lhs.dtype() != rhs.dtype() {
        return Err(IrError::InvalidGraph(format!(
            "{op_type} operands have different element types: {} vs {}",
            lhs.dtype(),
            rhs.dtype()
        )));
    }
    Ok(())
}

macro_rules! binary_op {
    ($name:ident, $op_type:literal, $method:ident) => {
        #[doc = concat!("Element-wise `", $op_type, "` with numpy broadcasting.")]
        pub struct $name;

        impl IrOperator for $name {
            fn op_type(&self) -> &str {
                $op_type
            }

            fn execute(
                &self,
                inputs: &[&Tensor],
                _attributes: &HashMap<String, NodeAttribute>,
            ) -> Result<Vec<Tensor>> {
                expect_inputs($op_type, inputs, 2, 2)?;
                check_same_type($op_type, inputs[0], inputs[1])?;
                Ok(vec![inputs[0].$method(inputs[1])?])
            }
        }
    };
}

binary_op!(AddOp, "Add", add);
binary_op!(SubtractOp, "Subtract", sub);
binary_op!(MultiplyOp, "Multiply", mul);
// Integer operands floor, matching the `floor` rounding mode the converter emits.
binary_op!(DivideOp, "Divide", div);

/// Matrix product of the last two dimensions.
pub struct MatMulOp;

impl IrOperator for MatMulOp {
    fn op_type(&self) -> &str {
        "MatMul"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        _attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("MatMul", inputs, 2, 2)?;
        check_same_type("MatMul", inputs[0], inputs[1])?;
        Ok(vec![inputs[0].matmul(inputs[1])?])
    }
}

/// Softmax along `axis` (default: last).
pub struct SoftmaxOp;

impl IrOperator for SoftmaxOp {
    fn op_type(&self) -> &str {
        "Softmax"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Softmax", inputs, 1, 1)?;
        let axis = int_attr(attributes, "axis")?.unwrap_or(-1);
        let axis = normalize_axis(axis, inputs[0].rank())?;
        Ok(vec![inputs[0].softmax(axis)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcheck_core::DataType;

    #[test]
    fn test_divide_floors_integers() {
        let a = Tensor::from_i64(vec![7, -7], vec![2]).unwrap();
        let b = Tensor::from_i64(vec![2, 2], vec![2]).unwrap();
        let out = DivideOp.execute(&[&a, &b], &HashMap::new()).unwrap();
        assert_eq!(out[0].to_vec_i64().unwrap(), vec![3, -4]);
    }

    #[test]
    fn test_mixed_types_rejected() {
        let a = Tensor::from_i64(vec![1], vec![1]).unwrap();
        let b = Tensor::from_data(vec![1.0], vec![1], DataType::F32).unwrap();
        assert!(AddOp.execute(&[&a, &b], &HashMap::new()).is_err());
    }

    #[test]
    fn test_softmax_negative_axis() {
        let x = Tensor::from_data(vec![0.0, 0.0, 1.0, 1.0], vec![2, 2], DataType::F32).unwrap();
        let mut attrs = HashMap::new();
        attrs.insert("axis".to_string(), NodeAttribute::Int(-1));
        let out = SoftmaxOp.execute(&[&x], &attrs).unwrap();
        for v in out[0].to_vec().unwrap() {
            assert!((v - 0.5).abs() < 1e-6);
        }
    }
}
