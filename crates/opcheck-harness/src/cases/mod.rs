//! Conformance case tables.
//!
//! Every table is a static, ordered list; a case is identified by its
//! parameter tuple rendered as a stable id such as
//! `pad4d[pads=(1, 2, 3, 4), mode=reflect, value=None]`. Cases carry the
//! tiers they run in; tiers only gate selection.

mod addmm;
mod fill;
mod pad;

pub use addmm::{addmm_cases, Coefficient};
pub use fill::{fill_any_like_cases, FillInput, FillVariant, FILL_VARIANTS};
pub use pad::{pad_cases, pad_list_cases};

use crate::error::{HarnessError, Result};
use crate::provision::InputSpec;
use opcheck_core::ops::padding::expand_pads;
use opcheck_core::{DataType, PadMode};
use opcheck_frontend::{AddmmModule, FillAnyLikeModule, ListPadModule, Module, PadModule};
use std::fmt;
use std::str::FromStr;

/// Base input shape; an `n`-d case uses its first `n` entries.
pub const PAD_INPUT_SHAPE: [usize; 5] = [1, 3, 14, 14, 18];

/// Names of every suite, in run order.
pub const SUITES: [&str; 8] = [
    "pad4d",
    "pad5d",
    "pad2d",
    "pad_list4d",
    "pad_list5d",
    "pad_list2d",
    "addmm",
    "fill_any_like",
];

/// CI tier a case is scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Fast gate run on every change.
    Precommit,
    /// Full run.
    Nightly,
}

impl Tier {
    /// Lowercase tier name.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Precommit => "precommit",
            Tier::Nightly => "nightly",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "precommit" => Ok(Tier::Precommit),
            "nightly" => Ok(Tier::Nightly),
            other => Err(HarnessError::Config(format!("unknown tier '{other}'"))),
        }
    }
}

pub(crate) const NIGHTLY_PRECOMMIT: &[Tier] = &[Tier::Nightly, Tier::Precommit];
pub(crate) const NIGHTLY: &[Tier] = &[Tier::Nightly];

/// Operator-variant parameters of a case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseParams {
    /// `F.pad(x, pads, mode, value)` with static widths.
    Pad {
        /// Input rank.
        ndim: usize,
        /// Flat `(begin, end)` pairs from the last dimension.
        pads: Vec<i64>,
        /// Padding mode.
        mode: PadMode,
        /// Fill value for constant mode.
        value: Option<f64>,
    },
    /// Padding by runtime `int32` widths.
    PadList {
        /// Input rank.
        ndim: usize,
        /// Total width for the last dimension.
        pad_w: i32,
        /// Total width for the second-to-last dimension.
        pad_h: i32,
        /// Declared mode; the module does not apply it.
        mode: PadMode,
        /// Fill value.
        value: Option<f64>,
    },
    /// `torch.addmm(m0, m1, m2, alpha, beta)`.
    Addmm {
        /// Shape of `m0`.
        input_shape: [usize; 2],
        /// Shape of `m1`.
        matrix1_shape: [usize; 2],
        /// Shape of `m2`.
        matrix2_shape: [usize; 2],
        /// Product scale.
        alpha: Coefficient,
        /// Input scale.
        beta: Coefficient,
    },
    /// `fill_any_like` followed by a float32 cast.
    FillAnyLike(FillVariant),
}

/// A single-operator module and the tag its traced graph must contain.
pub struct BuiltModule {
    /// The module under test.
    pub module: Box<dyn Module>,
    /// Expected operator tag.
    pub op_tag: String,
}

impl CaseParams {
    /// Construct the module for these parameters.
    pub fn build_module(&self) -> BuiltModule {
        let module: Box<dyn Module> = match self {
            CaseParams::Pad {
                pads, mode, value, ..
            } => Box::new(PadModule::new(pads.clone(), *mode, *value)),
            CaseParams::PadList { mode, value, .. } => Box::new(ListPadModule::new(*mode, *value)),
            CaseParams::Addmm { alpha, beta, .. } => {
                Box::new(AddmmModule::new(alpha.value(), beta.value()))
            }
            CaseParams::FillAnyLike(variant) => {
                Box::new(FillAnyLikeModule::new(variant.value, variant.dtype))
            }
        };
        let op_tag = module.op_tag().to_string();
        BuiltModule { module, op_tag }
    }

    /// Feed names, in order.
    pub fn input_names(&self) -> Vec<String> {
        let names: &[&str] = match self {
            CaseParams::Pad { .. } | CaseParams::FillAnyLike(_) => &["x"],
            CaseParams::PadList { .. } => &["x", "pad_w", "pad_h"],
            CaseParams::Addmm { .. } => &["m0", "m1", "m2"],
        };
        names.iter().map(|name| name.to_string()).collect()
    }

    /// Declared inputs, in feed order.
    pub fn input_specs(&self) -> Result<Vec<InputSpec>> {
        let specs = match self {
            CaseParams::Pad { ndim, .. } => vec![InputSpec::random_typed(
                &PAD_INPUT_SHAPE[..*ndim],
                DataType::F32,
            )],
            CaseParams::PadList {
                ndim, pad_w, pad_h, ..
            } => vec![
                InputSpec::random_typed(&PAD_INPUT_SHAPE[..*ndim], DataType::F32),
                InputSpec::int32_scalar(*pad_w)?,
                InputSpec::int32_scalar(*pad_h)?,
            ],
            CaseParams::Addmm {
                input_shape,
                matrix1_shape,
                matrix2_shape,
                ..
            } => vec![
                InputSpec::random_typed(input_shape, DataType::F32),
                InputSpec::random_typed(matrix1_shape, DataType::F32),
                InputSpec::random_typed(matrix2_shape, DataType::F32),
            ],
            CaseParams::FillAnyLike(variant) => vec![variant.input.spec()],
        };
        Ok(specs)
    }

    /// Reject impossible parameters before anything executes.
    pub fn validate(&self, case_id: &str) -> Result<()> {
        match self {
            CaseParams::Pad { ndim, pads, .. } => {
                if *ndim == 0 || *ndim > PAD_INPUT_SHAPE.len() {
                    return Err(HarnessError::invalid_case(
                        case_id,
                        format!("rank {ndim} is not supported"),
                    ));
                }
                expand_pads(pads, *ndim)?;
            }
            CaseParams::PadList { ndim, .. } => {
                if *ndim < 2 || *ndim > PAD_INPUT_SHAPE.len() {
                    return Err(HarnessError::invalid_case(
                        case_id,
                        format!("list padding needs rank 2..=5, got {ndim}"),
                    ));
                }
            }
            CaseParams::Addmm {
                matrix1_shape,
                matrix2_shape,
                ..
            } => {
                if matrix1_shape[1] != matrix2_shape[0] {
                    return Err(HarnessError::invalid_case(
                        case_id,
                        format!("cannot multiply {matrix1_shape:?} by {matrix2_shape:?}"),
                    ));
                }
            }
            CaseParams::FillAnyLike(_) => {}
        }
        Ok(())
    }
}

/// One executable conformance case.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Suite the case belongs to.
    pub suite: &'static str,
    /// Stable id.
    pub id: String,
    /// Tiers the case runs in.
    pub tiers: &'static [Tier],
    /// Operator-variant parameters.
    pub params: CaseParams,
}

impl TestCase {
    /// Whether the case is scheduled in `tier`.
    pub fn in_tier(&self, tier: Tier) -> bool {
        self.tiers.contains(&tier)
    }
}

/// Criteria for picking cases out of the tables.
#[derive(Debug, Clone, Default)]
pub struct CaseSelection {
    /// Only this suite.
    pub suite: Option<String>,
    /// Only cases scheduled in this tier.
    pub tier: Option<Tier>,
    /// Only ids containing this substring.
    pub filter: Option<String>,
}

impl CaseSelection {
    /// Whether `case` satisfies every criterion.
    pub fn matches(&self, case: &TestCase) -> bool {
        self.suite.as_deref().map_or(true, |suite| case.suite == suite)
            && self.tier.map_or(true, |tier| case.in_tier(tier))
            && self
                .filter
                .as_deref()
                .map_or(true, |filter| case.id.contains(filter))
    }
}

/// Cases of one suite, in table order.
pub fn suite_cases(suite: &str) -> Result<Vec<TestCase>> {
    match suite {
        "pad4d" => Ok(pad_cases(4)),
        "pad5d" => Ok(pad_cases(5)),
        "pad2d" => Ok(pad_cases(2)),
        "pad_list4d" => Ok(pad_list_cases(4)),
        "pad_list5d" => Ok(pad_list_cases(5)),
        "pad_list2d" => Ok(pad_list_cases(2)),
        "addmm" => Ok(addmm_cases()),
        "fill_any_like" => Ok(fill_any_like_cases()),
        other => Err(HarnessError::UnknownSuite(other.to_string())),
    }
}

/// Every case of every suite.
pub fn all_cases() -> Vec<TestCase> {
    SUITES
        .iter()
        .filter_map(|suite| suite_cases(suite).ok())
        .flatten()
        .collect()
}

/// Cases matching `selection`, in table order.
pub fn select_cases(selection: &CaseSelection) -> Result<Vec<TestCase>> {
    let pool = match &selection.suite {
        Some(suite) => suite_cases(suite)?,
        None => all_cases(),
    };
    Ok(pool
        .into_iter()
        .filter(|case| selection.matches(case))
        .collect())
}

pub(crate) fn format_tuple<T: fmt::Display>(items: &[T]) -> String {
    let inner: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("({})", inner.join(", "))
}

pub(crate) fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => "None".to_string(),
    }
}
