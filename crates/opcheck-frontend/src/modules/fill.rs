use crate::error::Result;
use crate::functional;
use crate::module::{expect_inputs, Module};
use crate::tracer::Tracer;
use opcheck_core::{DataType, NodeAttribute, Tensor};
use std::collections::HashMap;

/// `fill_any_like(x, value, dtype)` followed by a cast to float32.
#[derive(Debug, Clone, Copy)]
pub struct FillAnyLikeModule {
    value: f64,
    dtype: Option<DataType>,
}

impl FillAnyLikeModule {
    /// Create a fill module; `dtype: None` keeps the input's type.
    pub fn new(value: f64, dtype: Option<DataType>) -> Self {
        Self { value, dtype }
    }
}

impl Module for FillAnyLikeModule {
    fn op_tag(&self) -> &str {
        "fill_any_like"
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        expect_inputs("FillAnyLikeModule", inputs, 1)?;
        let filled = functional::full_like(&inputs[0], self.value, self.dtype)?;
        Ok(vec![functional::cast(&filled, DataType::F32)?])
    }

    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> Result<Vec<String>> {
        expect_inputs("FillAnyLikeModule", inputs, 1)?;
        let mut attrs = HashMap::new();
        attrs.insert("value".to_string(), NodeAttribute::Float(self.value));
        if let Some(dtype) = self.dtype {
            attrs.insert(
                "dtype".to_string(),
                NodeAttribute::String(dtype.name().to_string()),
            );
        }
        let filled = tracer.call("fill_any_like", inputs, attrs)?;

        let mut cast = HashMap::new();
        cast.insert(
            "dtype".to_string(),
            NodeAttribute::String(DataType::F32.name().to_string()),
        );
        tracer.call("cast", &filled, cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_i32_stored_as_float() {
        let x = Tensor::zeros(vec![8, 24, 32], DataType::F32).unwrap();
        let out = FillAnyLikeModule::new(2.0, Some(DataType::I32))
            .forward(&[x])
            .unwrap()
            .remove(0);
        assert_eq!(out.dtype(), DataType::F32);
        assert_eq!(out.shape(), vec![8, 24, 32]);
        assert!(out.to_vec().unwrap().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_fill_bool_false() {
        let x = Tensor::from_bool(vec![true, false, true], vec![3]).unwrap();
        let out = FillAnyLikeModule::new(0.0, None).forward(&[x]).unwrap().remove(0);
        assert_eq!(out.to_vec().unwrap(), vec![0.0, 0.0, 0.0]);
    }
}
