//! The IR `Pad` operator agrees with the eager padding kernels.

use opcheck_core::{DataType, NodeAttribute, PadMode, PadOps, Tensor};
use opcheck_ir::{IrOperator, OperatorRegistry};
use proptest::prelude::*;
use std::collections::HashMap;

fn ramp(shape: &[usize]) -> Tensor {
    let n: usize = shape.iter().product();
    let data = (0..n).map(|i| (i as f32).sin()).collect();
    Tensor::from_data(data, shape.to_vec(), DataType::F32).unwrap()
}

fn ir_pad(x: &Tensor, begins: Vec<i64>, ends: Vec<i64>, mode: &str, value: f64) -> Tensor {
    let rank = begins.len();
    let b = Tensor::from_i64(begins, vec![rank]).unwrap();
    let e = Tensor::from_i64(ends, vec![rank]).unwrap();
    let v = Tensor::full(value, vec![], DataType::F32).unwrap();
    let mut attrs = HashMap::new();
    attrs.insert("pad_mode".to_string(), NodeAttribute::String(mode.to_string()));
    let registry = OperatorRegistry::new();
    let op: &dyn IrOperator = registry.get("Pad").unwrap();
    op.execute(&[x, &b, &e, &v], &attrs).unwrap().remove(0)
}

proptest! {
    #[test]
    fn pad_matches_eager_kernel(
        shape in prop::collection::vec(3usize..6, 2..4),
        widths in prop::collection::vec(0i64..3, 6),
        mode_index in 0usize..3,
        value in -2.0f64..2.0,
    ) {
        let rank = shape.len();
        let x = ramp(&shape);
        let (mode, ir_mode) = [
            (PadMode::Constant, "constant"),
            (PadMode::Replicate, "edge"),
            (PadMode::Reflect, "reflect"),
        ][mode_index];

        // Eager pads list pairs from the last dimension backwards.
        let pairs = rank.min(widths.len() / 2);
        let pads = &widths[..pairs * 2];
        let eager = x.pad(pads, mode, value).unwrap();

        let mut begins = vec![0i64; rank];
        let mut ends = vec![0i64; rank];
        for i in 0..pairs {
            begins[rank - 1 - i] = pads[2 * i];
            ends[rank - 1 - i] = pads[2 * i + 1];
        }
        let lowered = ir_pad(&x, begins, ends, ir_mode, value);

        prop_assert_eq!(eager.shape(), lowered.shape());
        for (a, b) in eager.to_vec().unwrap().iter().zip(lowered.to_vec().unwrap()) {
            prop_assert!((a - b).abs() < 1e-6);
        }
    }
}
