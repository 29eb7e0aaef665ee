use crate::error::Result;
use crate::functional;
use crate::module::{expect_inputs, Module};
use crate::tracer::Tracer;
use opcheck_core::{NodeAttribute, Tensor};
use std::collections::HashMap;

/// `torch.addmm(m0, m1, m2, alpha=alpha, beta=beta)`.
#[derive(Debug, Clone, Copy)]
pub struct AddmmModule {
    alpha: f64,
    beta: f64,
}

impl AddmmModule {
    /// Create an addmm module.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }
}

impl Module for AddmmModule {
    fn op_tag(&self) -> &str {
        "aten::addmm"
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        expect_inputs("AddmmModule", inputs, 3)?;
        Ok(vec![functional::addmm(
            &inputs[0], &inputs[1], &inputs[2], self.beta, self.alpha,
        )?])
    }

    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> Result<Vec<String>> {
        expect_inputs("AddmmModule", inputs, 3)?;
        let mut attrs = HashMap::new();
        attrs.insert("alpha".to_string(), NodeAttribute::Float(self.alpha));
        attrs.insert("beta".to_string(), NodeAttribute::Float(self.beta));
        tracer.call("aten::addmm", inputs, attrs)
    }
}
