//! Hub-model conversion check.
//!
//! A hub model is a small classifier (flatten, dense layer, softmax over
//! [`NUM_CLASSES`]) exposed through one of three call conventions. The
//! convention is resolved once, when the model is loaded, into an
//! [`InputSignature`] and an [`OutputStructure`].

use crate::compare::Mismatch;
use crate::driver::{CaseStatus, Driver};
use crate::error::{HarnessError, Result};
use crate::provision::{InputProvisioner, ProvisionConfig};
use opcheck_core::{DataType, NodeAttribute, Tensor, TensorSpec};
use opcheck_frontend::{functional, trace_module, Module, Tracer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Output classes of every hub model.
pub const NUM_CLASSES: usize = 20;
/// Input image shape (NHWC).
pub const IMAGE_SHAPE: [usize; 4] = [1, 8, 8, 3];
/// Known model names.
pub const HUB_MODELS: [&str; 3] = [
    "dense_softmax_dict",
    "dense_softmax_list",
    "dense_softmax_single",
];

const WEIGHT_SEED: u64 = 0x5eed;

/// How a model takes its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSignature {
    /// Keyword inputs.
    Named(Vec<String>),
    /// Positional list.
    Ordered(Vec<String>),
    /// One bare tensor.
    Single(String),
}

impl InputSignature {
    /// Input names in feed order.
    pub fn names(&self) -> Vec<String> {
        match self {
            InputSignature::Named(names) | InputSignature::Ordered(names) => names.clone(),
            InputSignature::Single(name) => vec![name.clone()],
        }
    }
}

/// How a model returns its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStructure {
    /// Mapping from output name to tensor.
    Named(Vec<String>),
    /// Positional list.
    Ordered,
    /// One bare tensor.
    Single,
}

/// Inputs shaped by an [`InputSignature`].
#[derive(Debug, Clone)]
pub enum HubInputs {
    /// Keyword inputs.
    Named(HashMap<String, Tensor>),
    /// Positional inputs.
    Ordered(Vec<Tensor>),
    /// One tensor.
    Single(Tensor),
}

/// Outputs shaped by an [`OutputStructure`].
#[derive(Debug, Clone)]
pub enum HubOutputs {
    /// Named outputs.
    Named(BTreeMap<String, Tensor>),
    /// Positional outputs.
    Ordered(Vec<Tensor>),
    /// One tensor.
    Single(Tensor),
}

impl HubOutputs {
    /// Flatten to the model's fetch order.
    pub fn into_ordered(self, structure: &OutputStructure) -> Result<Vec<Tensor>> {
        match (self, structure) {
            (HubOutputs::Named(mut map), OutputStructure::Named(names)) => names
                .iter()
                .map(|name| {
                    map.remove(name).ok_or_else(|| {
                        HarnessError::Config(format!("model produced no output named '{name}'"))
                    })
                })
                .collect(),
            (HubOutputs::Ordered(list), _) => Ok(list),
            (HubOutputs::Single(tensor), _) => Ok(vec![tensor]),
            (HubOutputs::Named(map), _) => Ok(map.into_values().collect()),
        }
    }
}

/// One entry of [`HubModel::inputs_info`].
#[derive(Debug, Clone, PartialEq)]
pub enum InputInfo {
    /// Marks the following entries as positional.
    List,
    /// A named input with its spec.
    Input {
        /// Input name.
        name: String,
        /// Element type and shape.
        spec: TensorSpec,
    },
}

/// Flatten, dense layer via `aten::addmm`, softmax.
#[derive(Debug, Clone)]
pub struct DenseSoftmax {
    weight: Tensor,
    bias: Tensor,
}

impl DenseSoftmax {
    /// Layer with deterministic weights for `features` inputs.
    pub fn new(features: usize) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(WEIGHT_SEED);
        let scale = 1.0 / (features as f32).sqrt();
        let weight: Vec<f32> = (0..features * NUM_CLASSES)
            .map(|_| rng.gen_range(-scale..scale))
            .collect();
        let bias: Vec<f32> = (0..NUM_CLASSES).map(|_| rng.gen_range(-0.1..0.1)).collect();
        Ok(Self {
            weight: Tensor::from_data(weight, vec![features, NUM_CLASSES], DataType::F32)?,
            bias: Tensor::from_data(bias, vec![1, NUM_CLASSES], DataType::F32)?,
        })
    }
}

impl Module for DenseSoftmax {
    fn op_tag(&self) -> &str {
        "aten::softmax"
    }

    fn forward(&self, inputs: &[Tensor]) -> opcheck_frontend::Result<Vec<Tensor>> {
        let [image] = inputs else {
            return Err(opcheck_frontend::FrontendError::InvalidModel(format!(
                "DenseSoftmax takes 1 input, got {}",
                inputs.len()
            )));
        };
        let flat = functional::flatten(image, 1)?;
        let logits = functional::addmm(&self.bias, &flat, &self.weight, 1.0, 1.0)?;
        Ok(vec![functional::softmax(&logits, -1)?])
    }

    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> opcheck_frontend::Result<Vec<String>> {
        let [image] = inputs else {
            return Err(opcheck_frontend::FrontendError::InvalidModel(format!(
                "DenseSoftmax takes 1 input, got {}",
                inputs.len()
            )));
        };
        let mut flatten = HashMap::new();
        flatten.insert("start_dim".to_string(), NodeAttribute::Int(1));
        let flat = tracer.call("aten::flatten", std::slice::from_ref(image), flatten)?;

        let weight = tracer.constant(self.weight.clone())?;
        let bias = tracer.constant(self.bias.clone())?;
        let mut dense = HashMap::new();
        dense.insert("alpha".to_string(), NodeAttribute::Float(1.0));
        dense.insert("beta".to_string(), NodeAttribute::Float(1.0));
        let logits = tracer.call("aten::addmm", &[bias, flat[0].clone(), weight], dense)?;

        let mut softmax = HashMap::new();
        softmax.insert("dim".to_string(), NodeAttribute::Int(-1));
        tracer.call("aten::softmax", &logits, softmax)
    }
}

/// A loaded hub model.
#[derive(Debug, Clone)]
pub struct HubModel {
    /// Model name.
    pub name: String,
    /// The classifier.
    pub module: DenseSoftmax,
    /// Input convention.
    pub signature: InputSignature,
    /// Output convention.
    pub outputs: OutputStructure,
}

impl HubModel {
    /// Element type and shape of the image input.
    pub fn image_spec() -> TensorSpec {
        TensorSpec::new(DataType::F32, IMAGE_SHAPE.to_vec())
    }

    /// Input description: named specs for keyword models, otherwise a
    /// [`InputInfo::List`] marker followed by the specs.
    pub fn inputs_info(&self) -> Vec<InputInfo> {
        let specs = self.signature.names().into_iter().map(|name| InputInfo::Input {
            name,
            spec: Self::image_spec(),
        });
        match self.signature {
            InputSignature::Named(_) => specs.collect(),
            InputSignature::Ordered(_) | InputSignature::Single(_) => {
                std::iter::once(InputInfo::List).chain(specs).collect()
            }
        }
    }

    /// Shape a feed-ordered input list by the model's signature.
    pub fn prepare_inputs(&self, inputs: Vec<Tensor>) -> Result<HubInputs> {
        let names = self.signature.names();
        if inputs.len() != names.len() {
            return Err(HarnessError::Config(format!(
                "{} takes {} inputs, got {}",
                self.name,
                names.len(),
                inputs.len()
            )));
        }
        Ok(match &self.signature {
            InputSignature::Named(_) => HubInputs::Named(names.into_iter().zip(inputs).collect()),
            InputSignature::Ordered(_) => HubInputs::Ordered(inputs),
            InputSignature::Single(_) => {
                HubInputs::Single(inputs.into_iter().next().ok_or_else(|| {
                    HarnessError::Config(format!("{} needs one input", self.name))
                })?)
            }
        })
    }

    /// Call the model eagerly through its convention.
    pub fn infer(&self, inputs: HubInputs) -> Result<HubOutputs> {
        let feed = match inputs {
            HubInputs::Named(mut map) => self
                .signature
                .names()
                .iter()
                .map(|name| {
                    map.remove(name).ok_or_else(|| {
                        HarnessError::Config(format!("missing input '{name}' for {}", self.name))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            HubInputs::Ordered(list) => list,
            HubInputs::Single(tensor) => vec![tensor],
        };
        let mut outputs = self.module.forward(&feed)?;
        Ok(match &self.outputs {
            OutputStructure::Named(names) => {
                HubOutputs::Named(names.iter().cloned().zip(outputs).collect())
            }
            OutputStructure::Ordered => HubOutputs::Ordered(outputs),
            OutputStructure::Single => match outputs.len() {
                1 => HubOutputs::Single(outputs.remove(0)),
                n => {
                    return Err(HarnessError::Config(format!(
                        "{} declares a single output but produced {n}",
                        self.name
                    )))
                }
            },
        })
    }
}

/// Catalogue of hub models.
pub struct ModelHub;

impl ModelHub {
    /// Load `name`, resolving its call convention.
    pub fn load(name: &str) -> Result<HubModel> {
        let image = "image".to_string();
        let (signature, outputs) = match name {
            "dense_softmax_dict" => (
                InputSignature::Named(vec![image]),
                OutputStructure::Named(vec!["softmax".to_string()]),
            ),
            "dense_softmax_list" => (InputSignature::Ordered(vec![image]), OutputStructure::Ordered),
            "dense_softmax_single" => (InputSignature::Single(image), OutputStructure::Single),
            other => {
                return Err(HarnessError::UnknownModel {
                    name: other.to_string(),
                    known: HUB_MODELS.join(", "),
                })
            }
        };
        let features = IMAGE_SHAPE[1..].iter().product();
        Ok(HubModel {
            name: name.to_string(),
            module: DenseSoftmax::new(features)?,
            signature,
            outputs,
        })
    }
}

/// Trace, convert and compare a hub model like a layer case.
pub fn run_hub_check(
    driver: &Driver,
    model: &HubModel,
    provision: ProvisionConfig,
) -> Result<CaseStatus> {
    let mut provisioner = InputProvisioner::new(provision)?;
    let image = provisioner.sample(&IMAGE_SHAPE, DataType::F32)?;
    let feed = vec![image];

    let expected = model
        .infer(model.prepare_inputs(feed.clone())?)?
        .into_ordered(&model.outputs)?;

    let named: Vec<(String, Tensor)> = model
        .signature
        .names()
        .into_iter()
        .zip(feed.iter().cloned())
        .collect();
    let traced = trace_module(&model.module, &model.name, &named)?;
    let op_tag = model.module.op_tag();
    if !traced.contains_op(op_tag) {
        return Ok(CaseStatus::Failed(Mismatch::MissingOperator {
            op_tag: op_tag.to_string(),
            found: traced.op_tags(),
        }));
    }

    let status = driver.check_traced(&traced, &feed, &expected);
    info!("Hub model {} passed={}", model.name, status.is_passed());
    Ok(status)
}
