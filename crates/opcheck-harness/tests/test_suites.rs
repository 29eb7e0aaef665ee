//! Precommit suites through the full trace, convert and execute pipeline.

use opcheck_harness::{
    run_selection, run_suite, select_cases, CaseSelection, Driver, HarnessConfig, ProvisionConfig,
    SuiteReport, Tier,
};
use opcheck_ir::Precision;

fn seeded(seed: u64) -> HarnessConfig {
    HarnessConfig::new().with_provision(ProvisionConfig::default().with_seed(Some(seed)))
}

fn assert_passed(report: &SuiteReport) {
    assert!(
        report.all_passed(),
        "{}: {}/{} passed\nfailures: {:#?}\nerrors: {:#?}",
        report.suite,
        report.pass_count,
        report.case_count,
        report.failures,
        report.errors
    );
}

#[test]
fn test_precommit_tier_passes_fp32() {
    let driver = Driver::new(seeded(1));
    let selection = CaseSelection {
        tier: Some(Tier::Precommit),
        ..CaseSelection::default()
    };
    let reports = run_selection(&driver, &selection).unwrap();
    let suites: Vec<&str> = reports.iter().map(|r| r.suite.as_str()).collect();
    assert_eq!(
        suites,
        vec!["pad4d", "pad_list4d", "pad_list2d", "addmm", "fill_any_like"]
    );
    reports.iter().for_each(assert_passed);
}

#[test]
fn test_addmm_passes_fp16() {
    let driver = Driver::new(seeded(2).with_precision(Precision::FP16));
    let report = run_suite(&driver, "addmm").unwrap();
    assert_eq!(report.case_count, 45);
    assert_passed(&report);
}

#[test]
fn test_pad5d_with_ir_round_trip() {
    let config = seeded(3).with_ir_version(10).unwrap();
    let driver = Driver::new(config);
    let report = run_suite(&driver, "pad5d").unwrap();
    assert_eq!(report.case_count, 24);
    assert_passed(&report);
}

#[test]
fn test_pad2d_sequential() {
    let driver = Driver::new(seeded(4).with_parallel(false));
    let report = run_suite(&driver, "pad2d").unwrap();
    assert_passed(&report);
}

#[test]
fn test_circular_cases_by_filter() {
    let selection = CaseSelection {
        suite: Some("pad4d".to_string()),
        filter: Some("mode=circular".to_string()),
        ..CaseSelection::default()
    };
    assert_eq!(select_cases(&selection).unwrap().len(), 7);

    let driver = Driver::new(seeded(5).with_precision(Precision::FP16));
    let reports = run_selection(&driver, &selection).unwrap();
    assert_eq!(reports.len(), 1);
    assert_passed(&reports[0]);
}

#[test]
fn test_unknown_suite_is_an_error() {
    let driver = Driver::new(HarnessConfig::new());
    assert!(run_suite(&driver, "conv2d").is_err());
}
