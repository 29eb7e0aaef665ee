//! Output comparison between the eager reference and the converted model.

use crate::config::Tolerance;
use crate::error::Result;
use opcheck_core::Tensor;
use std::fmt;

/// Why a converted model's outputs were rejected.
#[derive(Debug, Clone)]
pub enum Mismatch {
    /// The traced graph does not contain the expected operator.
    MissingOperator {
        /// Expected tag.
        op_tag: String,
        /// Tags the graph does contain.
        found: Vec<String>,
    },
    /// Different number of outputs.
    OutputCount {
        /// Reference output count.
        expected: usize,
        /// Converted output count.
        actual: usize,
    },
    /// One output differs in shape, type or values.
    Output {
        /// Output position.
        index: usize,
        /// Human-readable cause.
        reason: String,
        /// Largest absolute difference, for value mismatches.
        max_abs_error: Option<f64>,
        /// Reference output.
        expected: Tensor,
        /// Converted output.
        actual: Tensor,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::MissingOperator { op_tag, found } => {
                write!(f, "traced graph has no {op_tag} (found {found:?})")
            }
            Mismatch::OutputCount { expected, actual } => {
                write!(f, "expected {expected} outputs, got {actual}")
            }
            Mismatch::Output {
                index,
                reason,
                max_abs_error,
                ..
            } => {
                write!(f, "output {index}: {reason}")?;
                if let Some(err) = max_abs_error {
                    write!(f, " (max abs error {err:e})")?;
                }
                Ok(())
            }
        }
    }
}

/// Compare outputs pairwise; returns the first mismatch.
pub fn compare_outputs(
    expected: &[Tensor],
    actual: &[Tensor],
    tolerance: Tolerance,
) -> Result<Option<Mismatch>> {
    if expected.len() != actual.len() {
        return Ok(Some(Mismatch::OutputCount {
            expected: expected.len(),
            actual: actual.len(),
        }));
    }

    for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
        let mismatch = |reason: String, max_abs_error: Option<f64>| Mismatch::Output {
            index,
            reason,
            max_abs_error,
            expected: want.clone(),
            actual: got.clone(),
        };

        if want.shape() != got.shape() {
            return Ok(Some(mismatch(
                format!("shape {:?} != {:?}", got.shape(), want.shape()),
                None,
            )));
        }
        if want.dtype() != got.dtype() {
            return Ok(Some(mismatch(
                format!("dtype {} != {}", got.dtype(), want.dtype()),
                None,
            )));
        }

        let want_values = want.to_vec_f64()?;
        let got_values = got.to_vec_f64()?;
        let mut max_abs_error = 0.0f64;
        let mut rejected = 0usize;
        for (&a, &b) in got_values.iter().zip(&want_values) {
            if a.is_finite() && b.is_finite() {
                max_abs_error = max_abs_error.max((a - b).abs());
            }
            if !tolerance.accepts(a, b) {
                rejected += 1;
            }
        }
        if rejected > 0 {
            return Ok(Some(mismatch(
                format!(
                    "{rejected} of {} elements outside atol={} rtol={}",
                    want_values.len(),
                    tolerance.atol,
                    tolerance.rtol
                ),
                Some(max_abs_error),
            )));
        }
    }
    Ok(None)
}
