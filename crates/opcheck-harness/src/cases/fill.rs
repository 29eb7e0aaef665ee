use super::{format_value, CaseParams, TestCase, NIGHTLY_PRECOMMIT};
use crate::provision::InputSpec;
use opcheck_core::DataType;

/// Input the fill variant is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillInput {
    /// `float32` uniform in `[0, 1)` of shape `(8, 24, 32)`.
    Uniform,
    /// Random booleans of shape `(13, 17, 11)`.
    RandomBool,
}

impl FillInput {
    /// Declared shape.
    pub fn shape(self) -> &'static [usize] {
        match self {
            FillInput::Uniform => &[8, 24, 32],
            FillInput::RandomBool => &[13, 17, 11],
        }
    }

    /// Declared element type.
    pub fn dtype(self) -> DataType {
        match self {
            FillInput::Uniform => DataType::F32,
            FillInput::RandomBool => DataType::Bool,
        }
    }

    /// Input spec for the provisioner.
    pub fn spec(self) -> InputSpec {
        InputSpec::random_typed(self.shape(), self.dtype())
    }
}

/// A named `fill_any_like` variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillVariant {
    /// Artifact and case name.
    pub name: &'static str,
    /// Fill value.
    pub value: f64,
    /// Target type; `None` keeps the input's type.
    pub dtype: Option<DataType>,
    /// Input the variant runs on.
    pub input: FillInput,
}

const fn variant(
    name: &'static str,
    value: f64,
    dtype: Option<DataType>,
    input: FillInput,
) -> FillVariant {
    FillVariant {
        name,
        value,
        dtype,
        input,
    }
}

/// The generated variants, in generation order.
pub const FILL_VARIANTS: [FillVariant; 9] = [
    variant("fill_any_like", 1.2, None, FillInput::Uniform),
    variant("fill_any_like_f16", 1.0, Some(DataType::F16), FillInput::Uniform),
    variant("fill_any_like_f32", 1.2, Some(DataType::F32), FillInput::Uniform),
    variant("fill_any_like_f64", 1.2, Some(DataType::F64), FillInput::Uniform),
    variant("fill_any_like_i16", 3.0, Some(DataType::I16), FillInput::Uniform),
    variant("fill_any_like_i32", 2.0, Some(DataType::I32), FillInput::Uniform),
    variant("fill_any_like_i64", 10.0, Some(DataType::I64), FillInput::Uniform),
    variant("fill_any_like_bool", 1.0, Some(DataType::Bool), FillInput::Uniform),
    variant("fill_any_like_bool_2", 0.0, None, FillInput::RandomBool),
];

/// One case per generator variant.
pub fn fill_any_like_cases() -> Vec<TestCase> {
    FILL_VARIANTS
        .iter()
        .map(|&variant| TestCase {
            suite: "fill_any_like",
            id: format!(
                "fill_any_like[name={}, value={}, dtype={}]",
                variant.name,
                format_value(Some(variant.value)),
                variant.dtype.map_or("None", DataType::name)
            ),
            tiers: NIGHTLY_PRECOMMIT,
            params: CaseParams::FillAnyLike(variant),
        })
        .collect()
}
