use super::{expect_inputs, read_dims, str_attr, IrOperator, Result};
use crate::error::IrError;
use opcheck_core::{DataType, NodeAttribute, ShapeOps, Tensor};
use std::collections::HashMap;

/// ShapeOf: the input's dimensions as a 1-D integer tensor
pub struct ShapeOfOp;

impl IrOperator for ShapeOfOp {
    fn op_type(&self) -> &str {
        "ShapeOf"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("ShapeOf", inputs, 1, 1)?;
        let output_type = match str_attr(attributes, "output_type")? {
            Some(name) => name.parse::<DataType>()?,
            None => DataType::I64,
        };
        if !output_type.is_integer() {
            return Err(IrError::InvalidAttribute {
                name: "output_type".to_string(),
                reason: format!("{output_type} is not an integer type"),
            });
        }

        let dims: Vec<i64> = inputs[0].shape().iter().map(|&d| d as i64).collect();
        let rank = dims.len();
        let shape = Tensor::from_i64(dims, vec![rank])?.cast(output_type)?;
        Ok(vec![shape])
    }
}

/// Broadcast: expand data to an explicit target shape (numpy rules)
pub struct BroadcastOp;

impl IrOperator for BroadcastOp {
    fn op_type(&self) -> &str {
        "Broadcast"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        _attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Broadcast", inputs, 2, 2)?;
        let target = read_dims("Broadcast", inputs[1])?;
        Ok(vec![inputs[0].broadcast_to(&target)?])
    }
}

/// Convert: change element type to `destination_type`
pub struct ConvertOp;

impl IrOperator for ConvertOp {
    fn op_type(&self) -> &str {
        "Convert"
    }

    fn execute(
        &self,
        inputs: &[&Tensor],
        attributes: &HashMap<String, NodeAttribute>,
    ) -> Result<Vec<Tensor>> {
        expect_inputs("Convert", inputs, 1, 1)?;
        let destination = str_attr(attributes, "destination_type")?.ok_or_else(|| {
            IrError::InvalidAttribute {
                name: "destination_type".to_string(),
                reason: "missing".to_string(),
            }
        })?;
        let destination: DataType = destination.parse()?;
        Ok(vec![inputs[0].cast(destination)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_of() {
        let x = Tensor::zeros(vec![8, 24, 32], DataType::F32).unwrap();
        let out = ShapeOfOp.execute(&[&x], &HashMap::new()).unwrap();
        assert_eq!(out[0].dtype(), DataType::I64);
        assert_eq!(out[0].to_vec_i64().unwrap(), vec![8, 24, 32]);
    }

    #[test]
    fn test_broadcast_scalar_then_convert() {
        let value = Tensor::full(1.2, vec![], DataType::F64).unwrap();
        let shape = Tensor::from_i64(vec![2, 3], vec![2]).unwrap();
        let filled = BroadcastOp
            .execute(&[&value, &shape], &HashMap::new())
            .unwrap()
            .remove(0);
        assert_eq!(filled.shape(), vec![2, 3]);

        let mut attrs = HashMap::new();
        attrs.insert(
            "destination_type".to_string(),
            NodeAttribute::String("int32".to_string()),
        );
        let converted = ConvertOp.execute(&[&filled], &attrs).unwrap().remove(0);
        assert_eq!(converted.dtype(), DataType::I32);
        assert_eq!(converted.to_vec_i64().unwrap(), vec![1; 6]);
    }

    #[test]
    fn test_convert_requires_destination() {
        let x = Tensor::zeros(vec![1], DataType::F32).unwrap();
        assert!(ConvertOp.execute(&[&x], &HashMap::new()).is_err());
    }
}
