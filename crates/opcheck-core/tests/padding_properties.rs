//! Property-based tests for padding semantics.

use opcheck_core::ops::padding::expand_pads;
use opcheck_core::{DataType, PadMode, PadOps, ShapeOps, Tensor};
use proptest::prelude::*;

fn tensor_from(shape: &[usize]) -> Tensor {
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (0..n).map(|i| (i as f32) * 0.5 - 3.0).collect();
    Tensor::from_data(data, shape.to_vec(), DataType::F32).unwrap()
}

fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..6, 1..5)
}

proptest! {
    #[test]
    fn constant_pad_grows_by_pad_sum(
        shape in shape_strategy(),
        widths in prop::collection::vec(0i64..4, 8),
        value in -10.0f64..10.0,
    ) {
        let pairs = (widths.len() / 2).min(shape.len());
        let pads = &widths[..pairs * 2];
        let x = tensor_from(&shape);
        let out = x.pad(pads, PadMode::Constant, value).unwrap();

        let per_dim = expand_pads(pads, shape.len()).unwrap();
        let expected: Vec<usize> = shape
            .iter()
            .zip(per_dim.iter())
            .map(|(&d, &(b, e))| (d as i64 + b + e) as usize)
            .collect();
        prop_assert_eq!(out.shape(), expected);
    }

    #[test]
    fn circular_negative_pad_equals_crop_then_wrap(
        len in 4usize..10,
        crop in 1i64..3,
        extend in 0i64..2,
    ) {
        let x = tensor_from(&[2, len]);
        let direct = x.pad(&[-crop, extend], PadMode::Circular, 0.0).unwrap();

        let cropped = x.narrow(1, crop as usize, len - crop as usize).unwrap();
        let staged = cropped.pad(&[0, extend], PadMode::Circular, 0.0).unwrap();

        prop_assert_eq!(direct.shape(), staged.shape());
        prop_assert_eq!(direct.to_vec().unwrap(), staged.to_vec().unwrap());
    }

    #[test]
    fn zero_pads_are_identity(shape in shape_strategy()) {
        let x = tensor_from(&shape);
        let pads = vec![0i64; shape.len() * 2];
        for mode in [PadMode::Constant, PadMode::Reflect, PadMode::Replicate, PadMode::Circular] {
            let out = x.pad(&pads, mode, 1.0).unwrap();
            prop_assert_eq!(out.to_vec().unwrap(), x.to_vec().unwrap());
        }
    }
}

#[test]
fn pad2d_constant_default_pads_last_dim_only() {
    let x = tensor_from(&[1, 3]);
    let out = x.pad(&[1, 0], PadMode::Constant, 0.0).unwrap();
    assert_eq!(out.shape(), vec![1, 4]);
    assert_eq!(out.to_vec().unwrap(), vec![0.0, -3.0, -2.5, -2.0]);
}

#[test]
fn circular_crop_of_five_d_case() {
    // (-5, -8) on the last dimension of size 14 keeps a single column.
    let x = tensor_from(&[1, 3, 2, 2, 14]);
    let out = x.pad(&[-5, -8, 0, 0], PadMode::Circular, 0.0).unwrap();
    assert_eq!(out.shape(), vec![1, 3, 2, 2, 1]);
}
