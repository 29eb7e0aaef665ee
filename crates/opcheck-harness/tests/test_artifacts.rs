//! Generated artifacts: layout, round trip and replay.

use opcheck_core::DataType;
use opcheck_harness::artifact::{MANIFEST_FILE, MODEL_FILE};
use opcheck_harness::cases::FILL_VARIANTS;
use opcheck_harness::{
    compare_outputs, generate_fill_any_like, load_artifact, replay_artifact, CaseStatus, Driver,
    HarnessConfig, ProvisionConfig, Tolerance,
};
use opcheck_ir::Precision;
use tempfile::TempDir;

fn generate(seed: u64) -> TempDir {
    let dir = TempDir::new().unwrap();
    let written =
        generate_fill_any_like(dir.path(), ProvisionConfig::default().with_seed(Some(seed)))
            .unwrap();
    assert_eq!(written.len(), FILL_VARIANTS.len());
    dir
}

#[test]
fn test_layout() {
    let dir = generate(1);
    for variant in FILL_VARIANTS.iter() {
        let artifact = dir.path().join(variant.name);
        for file in [MODEL_FILE, MANIFEST_FILE, "input0.npy", "output0.npy"] {
            assert!(artifact.join(file).is_file(), "{}/{file}", variant.name);
        }
    }
}

#[test]
fn test_manifest_contents() {
    let dir = generate(2);
    let artifact = load_artifact(&dir.path().join("fill_any_like_i32")).unwrap();
    assert_eq!(artifact.manifest.name, "fill_any_like_i32");
    assert_eq!(artifact.manifest.feed_keys, vec!["x".to_string()]);
    assert_eq!(artifact.manifest.fetch_list.len(), 1);
    assert_eq!(artifact.manifest.inputs[0].dtype, DataType::F32);
    assert_eq!(artifact.manifest.inputs[0].shape, vec![8, 24, 32]);
    assert_eq!(artifact.manifest.outputs[0].dtype, DataType::F32);

    let values = artifact.outputs[0].to_vec().unwrap();
    assert_eq!(values.len(), 8 * 24 * 32);
    assert!(values.iter().all(|&v| v == 2.0));
}

#[test]
fn test_bool_variant_keeps_bool_input() {
    let dir = generate(3);
    let artifact = load_artifact(&dir.path().join("fill_any_like_bool_2")).unwrap();
    assert_eq!(artifact.inputs[0].dtype(), DataType::Bool);
    assert_eq!(artifact.inputs[0].shape(), vec![13, 17, 11]);
    assert!(artifact.outputs[0].to_vec().unwrap().iter().all(|&v| v == 0.0));
}

#[test]
fn test_round_trip_reproduces_bundled_outputs() {
    let dir = generate(4);
    for variant in FILL_VARIANTS.iter() {
        let artifact = load_artifact(&dir.path().join(variant.name)).unwrap();
        let replayed = artifact.model.run(&artifact.inputs).unwrap();
        let mismatch =
            compare_outputs(&artifact.outputs, &replayed, Tolerance::new(1e-4, 1e-4)).unwrap();
        assert!(mismatch.is_none(), "{}: {mismatch:?}", variant.name);
    }
}

#[test]
fn test_replay_converts_and_matches() {
    let dir = generate(5);
    let fp32 = Driver::new(HarnessConfig::new());
    let fp16 = Driver::new(HarnessConfig::new().with_precision(Precision::FP16));
    for variant in FILL_VARIANTS.iter() {
        let path = dir.path().join(variant.name);
        for driver in [&fp32, &fp16] {
            let status = replay_artifact(&path, driver).unwrap();
            assert!(matches!(status, CaseStatus::Passed), "{}: {status:?}", variant.name);
        }
    }
}

#[test]
fn test_missing_manifest_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_artifact(dir.path()).is_err());
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let a = generate(6);
    let b = generate(6);
    let first = load_artifact(&a.path().join("fill_any_like")).unwrap();
    let second = load_artifact(&b.path().join("fill_any_like")).unwrap();
    assert_eq!(
        first.inputs[0].to_vec().unwrap(),
        second.inputs[0].to_vec().unwrap()
    );
}
