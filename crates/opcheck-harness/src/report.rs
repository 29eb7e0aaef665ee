//! Suite aggregation.

use crate::cases::{select_cases, CaseSelection, TestCase};
use crate::driver::{run_cases, CaseResult, CaseStatus, Driver};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Pass/fail summary of one suite.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// Cases executed.
    pub case_count: usize,
    /// Cases that passed.
    pub pass_count: usize,
    /// `<case id>: <reason>` for every numeric mismatch.
    pub failures: Vec<String>,
    /// `<case id>: <error>` for every case that could not execute.
    pub errors: Vec<String>,
}

impl SuiteReport {
    /// Summarize `results` that all belong to `suite`.
    pub fn from_results(suite: &str, results: &[CaseResult]) -> Self {
        let mut report = Self {
            suite: suite.to_string(),
            case_count: results.len(),
            pass_count: 0,
            failures: Vec::new(),
            errors: Vec::new(),
        };
        for result in results {
            match &result.status {
                CaseStatus::Passed => report.pass_count += 1,
                CaseStatus::Failed(mismatch) => report
                    .failures
                    .push(format!("{}: {}", result.case_id, mismatch)),
                CaseStatus::Error(err) => report.errors.push(format!("{}: {}", result.case_id, err)),
            }
        }
        report
    }

    /// Whether every case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.case_count == self.pass_count && self.failures.is_empty() && self.errors.is_empty()
    }
}

/// Group results by suite, keeping the order suites first appear in.
pub fn summarize(results: &[CaseResult]) -> Vec<SuiteReport> {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: BTreeMap<&str, Vec<CaseResult>> = BTreeMap::new();
    for result in results {
        let suite = result.suite.as_str();
        if !grouped.contains_key(suite) {
            order.push(suite);
        }
        grouped.entry(suite).or_default().push(result.clone());
    }
    order
        .into_iter()
        .map(|suite| SuiteReport::from_results(suite, &grouped[suite]))
        .collect()
}

/// Run every case matching `selection`.
pub fn run_selection(driver: &Driver, selection: &CaseSelection) -> Result<Vec<SuiteReport>> {
    let cases: Vec<TestCase> = select_cases(selection)?;
    let results = run_cases(driver, &cases)?;
    Ok(summarize(&results))
}

/// Run one suite in full.
pub fn run_suite(driver: &Driver, suite: &str) -> Result<SuiteReport> {
    let selection = CaseSelection {
        suite: Some(suite.to_string()),
        ..CaseSelection::default()
    };
    let cases = select_cases(&selection)?;
    let results = run_cases(driver, &cases)?;
    Ok(SuiteReport::from_results(suite, &results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Mismatch;
    use std::time::Duration;

    fn result(suite: &str, id: &str, status: CaseStatus) -> CaseResult {
        CaseResult {
            suite: suite.to_string(),
            case_id: id.to_string(),
            status,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_report_counts() {
        let results = vec![
            result("pad2d", "a", CaseStatus::Passed),
            result(
                "pad2d",
                "b",
                CaseStatus::Failed(Mismatch::OutputCount {
                    expected: 1,
                    actual: 2,
                }),
            ),
            result("pad2d", "c", CaseStatus::Error("boom".to_string())),
        ];
        let report = SuiteReport::from_results("pad2d", &results);
        assert_eq!(report.case_count, 3);
        assert_eq!(report.pass_count, 1);
        assert_eq!(report.failures, vec!["b: expected 1 outputs, got 2".to_string()]);
        assert_eq!(report.errors, vec!["c: boom".to_string()]);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_summarize_keeps_suite_order() {
        let results = vec![
            result("pad4d", "a", CaseStatus::Passed),
            result("addmm", "b", CaseStatus::Passed),
            result("pad4d", "c", CaseStatus::Passed),
        ];
        let reports = summarize(&results);
        let suites: Vec<&str> = reports.iter().map(|r| r.suite.as_str()).collect();
        assert_eq!(suites, vec!["pad4d", "addmm"]);
        assert_eq!(reports[0].case_count, 2);
        assert!(reports.iter().all(SuiteReport::all_passed));
    }
}
