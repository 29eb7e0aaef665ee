//! The module abstraction: eager forward plus a traceable description.

use crate::error::Result;
use crate::tracer::Tracer;
use opcheck_core::Tensor;

/// A stateless model wrapping one operator (or a short fixed pipeline).
pub trait Module: Send + Sync {
    /// Operator tag the converted graph is expected to contain.
    fn op_tag(&self) -> &str;

    /// Eager reference execution.
    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>>;

    /// Describe the computation on `tracer`, starting from the traced input names.
    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> Result<Vec<String>>;
}

pub(crate) fn expect_inputs<T>(module: &str, inputs: &[T], count: usize) -> Result<()> {
    if inputs.len() != count {
        return Err(crate::error::FrontendError::InvalidModel(format!(
            "{module} takes {count} inputs, got {}",
            inputs.len()
        )));
    }
    Ok(())
}
