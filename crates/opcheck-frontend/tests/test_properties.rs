//! Randomized agreement between eager execution and converted models.

use opcheck_core::{DataType, PadMode, Tensor};
use opcheck_frontend::{trace_module, AddmmModule, Converter, Module, PadModule};
use opcheck_ir::{InferenceSession, SessionOptions};
use proptest::prelude::*;
use std::sync::Arc;

fn tensor(shape: &[usize], seed: u32) -> Tensor {
    let n: usize = shape.iter().product();
    let data = (0..n)
        .map(|i| (((i as u32).wrapping_mul(2654435761) ^ seed) % 1000) as f32 / 500.0 - 1.0)
        .collect();
    Tensor::from_data(data, shape.to_vec(), DataType::F32).unwrap()
}

fn run_converted(module: &dyn Module, inputs: &[Tensor]) -> Vec<Tensor> {
    let named: Vec<(String, Tensor)> = inputs
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("input{i}"), t.clone()))
        .collect();
    let traced = trace_module(module, "prop", &named).unwrap();
    let ir = Converter::default().convert(&traced).unwrap();
    InferenceSession::new(Arc::new(ir), SessionOptions::new())
        .unwrap()
        .run_ordered(inputs)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn circular_lowering_matches_eager(
        rows in 3usize..6,
        cols in 3usize..8,
        pads in prop::collection::vec(-1i64..2, 4),
        seed in any::<u32>(),
    ) {
        let x = tensor(&[1, rows, cols], seed);
        let module = PadModule::new(pads, PadMode::Circular, None);
        let eager = module.forward(&[x.clone()]).unwrap();
        let converted = run_converted(&module, &[x]);
        prop_assert_eq!(eager[0].shape(), converted[0].shape());
        prop_assert_eq!(eager[0].to_vec().unwrap(), converted[0].to_vec().unwrap());
    }

    #[test]
    fn addmm_beta_zero_output_ignores_bias(
        n in 1usize..5,
        k in 1usize..5,
        p in 1usize..5,
        alpha in -3.0f64..3.0,
        seed in any::<u32>(),
    ) {
        let module = AddmmModule::new(alpha, 0.0);
        let m1 = tensor(&[n, k], seed);
        let m2 = tensor(&[k, p], seed.rotate_left(7));
        let a = module.forward(&[tensor(&[n, p], seed ^ 1), m1.clone(), m2.clone()]).unwrap();
        let b = module.forward(&[tensor(&[n, p], seed ^ 2), m1, m2]).unwrap();
        prop_assert_eq!(a[0].to_vec().unwrap(), b[0].to_vec().unwrap());
    }
}
