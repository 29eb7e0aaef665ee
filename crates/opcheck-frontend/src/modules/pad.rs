use crate::error::Result;
use crate::functional;
use crate::module::{expect_inputs, Module};
use crate::tracer::Tracer;
use opcheck_core::{DataType, NodeAttribute, PadMode, Tensor};
use std::collections::HashMap;

/// `F.pad(x, pads, mode, value)` with pads fixed at construction.
#[derive(Debug, Clone)]
pub struct PadModule {
    pads: Vec<i64>,
    mode: PadMode,
    value: Option<f64>,
}

impl PadModule {
    /// Create a pad module. Widths are passed through unmodified.
    pub fn new(pads: Vec<i64>, mode: PadMode, value: Option<f64>) -> Self {
        Self { pads, mode, value }
    }

    /// Padding widths.
    pub fn pads(&self) -> &[i64] {
        &self.pads
    }
}

fn pad_attributes(mode: PadMode, value: Option<f64>) -> HashMap<String, NodeAttribute> {
    let mut attrs = HashMap::new();
    attrs.insert(
        "mode".to_string(),
        NodeAttribute::String(mode.name().to_string()),
    );
    if let Some(value) = value {
        attrs.insert("value".to_string(), NodeAttribute::Float(value));
    }
    attrs
}

impl Module for PadModule {
    fn op_tag(&self) -> &str {
        "aten::pad"
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        expect_inputs("PadModule", inputs, 1)?;
        Ok(vec![functional::pad(
            &inputs[0],
            &self.pads,
            self.mode,
            self.value,
        )?])
    }

    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> Result<Vec<String>> {
        expect_inputs("PadModule", inputs, 1)?;
        let mut attrs = pad_attributes(self.mode, self.value);
        attrs.insert("pads".to_string(), NodeAttribute::IntArray(self.pads.clone()));
        tracer.call("aten::pad", &inputs[..1], attrs)
    }
}

/// Pads the last two dimensions by runtime widths `(pad_w, pad_h)`, split
/// as `[w // 2, w - w // 2, h // 2, h - h // 2]`.
///
/// `mode` is part of the case identity but is not applied: padding is
/// always constant with `value`.
#[derive(Debug, Clone)]
pub struct ListPadModule {
    mode: PadMode,
    value: Option<f64>,
}

impl ListPadModule {
    /// Create a list-padding module.
    pub fn new(mode: PadMode, value: Option<f64>) -> Self {
        Self { mode, value }
    }

    /// Mode the case was declared with.
    pub fn mode(&self) -> PadMode {
        self.mode
    }

    fn split(width: &Tensor, two: &Tensor) -> Result<(Tensor, Tensor)> {
        let half = functional::floor_divide(width, two)?;
        let rest = functional::sub(width, &half, 1.0)?;
        Ok((half, rest))
    }
}

impl Module for ListPadModule {
    fn op_tag(&self) -> &str {
        "aten::pad"
    }

    fn forward(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>> {
        expect_inputs("ListPadModule", inputs, 3)?;
        let two = Tensor::full(2.0, vec![], inputs[1].dtype())?;
        let (w_begin, w_end) = Self::split(&inputs[1], &two)?;
        let (h_begin, h_end) = Self::split(&inputs[2], &two)?;
        let pads = [w_begin, w_end, h_begin, h_end]
            .iter()
            .map(Tensor::scalar_i64)
            .collect::<anyhow::Result<Vec<i64>>>()?;
        Ok(vec![functional::pad(
            &inputs[0],
            &pads,
            PadMode::Constant,
            self.value,
        )?])
    }

    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> Result<Vec<String>> {
        expect_inputs("ListPadModule", inputs, 3)?;
        let width_type = tracer
            .value(&inputs[1])
            .map(Tensor::dtype)
            .unwrap_or(DataType::I32);
        let two = tracer.constant(Tensor::full(2.0, vec![], width_type)?)?;

        let mut items = Vec::with_capacity(4);
        for width in &inputs[1..] {
            let half = tracer.call(
                "aten::floor_divide",
                &[width.clone(), two.clone()],
                HashMap::new(),
            )?;
            let rest = tracer.call("aten::sub", &[width.clone(), half[0].clone()], HashMap::new())?;
            items.push(half[0].clone());
            items.push(rest[0].clone());
        }
        let list = tracer.call("prim::ListConstruct", &items, HashMap::new())?;

        let attrs = pad_attributes(PadMode::Constant, self.value);
        tracer.call("aten::pad", &[inputs[0].clone(), list[0].clone()], attrs)
    }
}
