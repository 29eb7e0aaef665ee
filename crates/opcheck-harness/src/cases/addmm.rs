use super::{format_tuple, CaseParams, TestCase, NIGHTLY_PRECOMMIT};
use std::fmt;

/// A scale factor as written in the case table. Integer and float spellings
/// of the same number are distinct cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    /// Float literal.
    Float(f64),
    /// Integer literal.
    Int(i64),
}

impl Coefficient {
    /// Numeric value.
    pub fn value(self) -> f64 {
        match self {
            Coefficient::Float(v) => v,
            Coefficient::Int(v) => v as f64,
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Float(v) => write!(f, "{v:?}"),
            Coefficient::Int(v) => write!(f, "{v}"),
        }
    }
}

const SHAPES: &[([usize; 2], [usize; 2], [usize; 2])] = &[
    ([3, 3], [3, 3], [3, 3]),
    ([2, 2], [2, 3], [3, 2]),
    ([10, 1], [10, 5], [5, 1]),
    ([1, 2], [1, 10], [10, 2]),
    ([1, 1], [1, 10], [10, 1]),
];

const SCALES: &[(Coefficient, Coefficient)] = {
    use Coefficient::{Float, Int};
    &[
        (Float(1.0), Float(1.0)),
        (Float(0.0), Float(1.0)),
        (Float(1.0), Float(0.0)),
        (Float(1.0), Float(2.0)),
        (Float(2.0), Float(1.0)),
        (Float(-5.0), Float(-6.0)),
        (Float(3.0), Float(4.0)),
        (Float(0.5), Float(0.75)),
        (Int(1), Int(1)),
    ]
};

/// Every shape triple crossed with every `(alpha, beta)` pair.
pub fn addmm_cases() -> Vec<TestCase> {
    SHAPES
        .iter()
        .flat_map(|&(input_shape, matrix1_shape, matrix2_shape)| {
            SCALES.iter().map(move |&(alpha, beta)| TestCase {
                suite: "addmm",
                id: format!(
                    "addmm[input_shape={}, matrix1_shape={}, matrix2_shape={}, alpha={alpha}, beta={beta}]",
                    format_tuple(&input_shape),
                    format_tuple(&matrix1_shape),
                    format_tuple(&matrix2_shape)
                ),
                tiers: NIGHTLY_PRECOMMIT,
                params: CaseParams::Addmm {
                    input_shape,
                    matrix1_shape,
                    matrix2_shape,
                    alpha,
                    beta,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_and_float_spellings_differ() {
        let cases = addmm_cases();
        assert!(cases[0].id.ends_with("alpha=1.0, beta=1.0]"));
        assert!(cases[8].id.ends_with("alpha=1, beta=1]"));
    }

    #[test]
    fn test_first_id() {
        assert_eq!(
            addmm_cases()[0].id,
            "addmm[input_shape=(3, 3), matrix1_shape=(3, 3), matrix2_shape=(3, 3), alpha=1.0, beta=1.0]"
        );
    }
}
