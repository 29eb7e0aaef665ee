//! Single-case scenarios with known outputs.

use opcheck_core::{DataType, PadMode, Tensor};
use opcheck_frontend::{AddmmModule, FillAnyLikeModule, Module, PadModule, Tracer};
use opcheck_harness::cases::Coefficient;
use opcheck_harness::{
    CaseParams, CaseStatus, Driver, HarnessConfig, HarnessError, InputProvisioner, Mismatch,
    ProvisionConfig, TestCase, Tier,
};

fn driver() -> Driver {
    Driver::new(HarnessConfig::new().with_provision(ProvisionConfig::default().with_seed(Some(11))))
}

fn named(name: &str, tensor: Tensor) -> Vec<(String, Tensor)> {
    vec![(name.to_string(), tensor)]
}

#[test]
fn test_fill_any_like_i32_is_stored_as_float32() {
    let mut provisioner =
        InputProvisioner::new(ProvisionConfig::default().with_seed(Some(1))).unwrap();
    let x = provisioner.sample(&[8, 24, 32], DataType::F32).unwrap();

    let module = FillAnyLikeModule::new(2.0, Some(DataType::I32));
    let out = module.forward(std::slice::from_ref(&x)).unwrap();
    assert_eq!(out[0].shape(), vec![8, 24, 32]);
    assert_eq!(out[0].dtype(), DataType::F32);
    assert!(out[0].to_vec().unwrap().iter().all(|&v| v == 2.0));

    let status = driver().check_module("fill_any_like_i32", &module, "fill_any_like", &named("x", x));
    assert!(status.is_passed(), "{status:?}");
}

#[test]
fn test_pad2d_pads_only_last_dimension() {
    let x = Tensor::from_data(vec![0.25, 0.5, 0.75], vec![1, 3], DataType::F32).unwrap();
    let module = PadModule::new(vec![1, 0], PadMode::Constant, None);
    let out = module.forward(std::slice::from_ref(&x)).unwrap();
    assert_eq!(out[0].shape(), vec![1, 4]);
    assert_eq!(out[0].to_vec().unwrap(), vec![0.0, 0.25, 0.5, 0.75]);

    let status = driver().check_module("pad2d", &module, "aten::pad", &named("x", x));
    assert!(status.is_passed(), "{status:?}");
}

#[test]
fn test_addmm_zero_beta_ignores_non_finite_bias() {
    let bias = Tensor::from_data(vec![f32::NAN, f32::INFINITY], vec![1, 2], DataType::F32).unwrap();
    let m1 = Tensor::from_data(vec![1.0, 2.0], vec![1, 2], DataType::F32).unwrap();
    let m2 = Tensor::from_data(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2], DataType::F32).unwrap();
    let module = AddmmModule::new(3.0, 0.0);

    let inputs = vec![bias, m1, m2];
    let out = module.forward(&inputs).unwrap();
    assert_eq!(out[0].to_vec().unwrap(), vec![3.0, 6.0]);

    let named: Vec<(String, Tensor)> = ["m0", "m1", "m2"]
        .iter()
        .map(|n| n.to_string())
        .zip(inputs)
        .collect();
    let status = driver().check_module("addmm", &module, "aten::addmm", &named);
    assert!(status.is_passed(), "{status:?}");
}

struct Mislabeled(PadModule);

impl Module for Mislabeled {
    fn op_tag(&self) -> &str {
        "aten::conv2d"
    }

    fn forward(&self, inputs: &[Tensor]) -> opcheck_frontend::Result<Vec<Tensor>> {
        self.0.forward(inputs)
    }

    fn trace(&self, tracer: &mut Tracer, inputs: &[String]) -> opcheck_frontend::Result<Vec<String>> {
        self.0.trace(tracer, inputs)
    }
}

#[test]
fn test_missing_operator_is_a_failure() {
    let module = Mislabeled(PadModule::new(vec![1, 1], PadMode::Constant, None));
    let x = Tensor::zeros(vec![2, 3], DataType::F32).unwrap();
    match driver().check_module("mislabeled", &module, module.op_tag(), &named("x", x)) {
        CaseStatus::Failed(Mismatch::MissingOperator { op_tag, found }) => {
            assert_eq!(op_tag, "aten::conv2d");
            assert_eq!(found, vec!["aten::pad".to_string()]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_over_wide_circular_pad_is_a_case_error() {
    let module = PadModule::new(vec![9, 0], PadMode::Circular, None);
    let x = Tensor::zeros(vec![2, 4], DataType::F32).unwrap();
    let status = driver().check_module("circular", &module, "aten::pad", &named("x", x));
    assert!(matches!(status, CaseStatus::Error(_)), "{status:?}");
}

#[test]
fn test_zero_dimension_fails_before_execution() {
    let case = TestCase {
        suite: "addmm",
        id: "addmm[input_shape=(0, 2)]".to_string(),
        tiers: &[Tier::Nightly],
        params: CaseParams::Addmm {
            input_shape: [0, 2],
            matrix1_shape: [1, 3],
            matrix2_shape: [3, 2],
            alpha: Coefficient::Float(1.0),
            beta: Coefficient::Float(1.0),
        },
    };
    let err = driver().run_case(&case, 0).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidCase { .. }), "{err}");
}

#[test]
fn test_incompatible_matrices_fail_before_execution() {
    let case = TestCase {
        suite: "addmm",
        id: "addmm[bad]".to_string(),
        tiers: &[Tier::Nightly],
        params: CaseParams::Addmm {
            input_shape: [2, 2],
            matrix1_shape: [2, 3],
            matrix2_shape: [4, 2],
            alpha: Coefficient::Int(1),
            beta: Coefficient::Int(1),
        },
    };
    assert!(driver().run_case(&case, 0).is_err());
}

#[test]
fn test_list_padding_ignores_declared_mode() {
    let case = opcheck_harness::cases::pad_list_cases(4)
        .into_iter()
        .find(|case| case.id == "pad_list4d[pad_w=10, pad_h=10, mode=reflect, value=None]")
        .unwrap();
    let result = driver().run_case(&case, 0).unwrap();
    assert!(result.status.is_passed(), "{:?}", result.status);
}
