use super::{format_tuple, format_value, CaseParams, TestCase, Tier, NIGHTLY, NIGHTLY_PRECOMMIT};
use opcheck_core::PadMode;
use PadMode::{Circular, Constant, Reflect, Replicate};

type StaticPad = (&'static [i64], PadMode, Option<f64>);

const PAD4D: &[StaticPad] = &[
    (&[1, 2, 3, 4], Reflect, None),
    (&[1, 0, 0, 0, 0, 1], Reflect, None),
    (&[0, 0, 0, 0, 0, 0], Reflect, None),
    (&[1, 2, 3, 4], Replicate, None),
    (&[1, 0, 0, 0, 0, 0], Replicate, None),
    (&[1, 0, 0, 0, 0, 1], Replicate, None),
    (&[0, 0, 0, 0, 0, 0], Replicate, None),
    (&[1, 2, 3, 4], Constant, None),
    (&[1, 2, 3, 4], Constant, Some(42.0)),
    (&[1, 2, 3, 4], Constant, Some(-0.57)),
    (&[1, 2], Constant, None),
    (&[1, 0, 0, 0, 0, 1], Constant, None),
    (&[0, 0, 0, 0, 0, 0], Constant, None),
    (&[1, 0, 0, 0, 0, 1, 1, 2], Constant, Some(0.0)),
    (&[1, 2, 0, 0], Circular, None),
    (&[1, 2, 3, 4], Circular, None),
    (&[0, 1, 0, 0], Circular, None),
    (&[0, 0, 0, 0], Circular, None),
    (&[0, 0, -1, -2], Circular, None),
    (&[-1, -2, -1, -2], Circular, None),
    (&[-5, -8, 0, 0], Circular, None),
];

const PAD5D: &[StaticPad] = &[
    (&[1, 2, 3, 4, 5, 6], Reflect, None),
    (&[1, 0, 0, 0, 0, 1], Reflect, None),
    (&[1, 0, 0, 0, 0, 0], Reflect, None),
    (&[0, 0, 0, 0, 0, 0], Reflect, None),
    (&[1, 2, 3, 4, 5, 6], Replicate, None),
    (&[1, 0, 0, 0, 0, 0], Replicate, None),
    (&[1, 0, 0, 0, 0, 1], Replicate, None),
    (&[0, 0, 0, 0, 0, 0], Replicate, None),
    (&[1, 2, 3, 4], Constant, None),
    (&[1, 2, 3, 4], Constant, Some(42.0)),
    (&[1, 2, 3, 4], Constant, Some(-0.57)),
    (&[1, 2], Constant, None),
    (&[1, 0, 0, 0, 0, 1], Constant, None),
    (&[0, 0, 0, 0, 0, 0], Constant, None),
    (&[1, 0, 0, 0, 0, 1, 1, 2], Constant, Some(0.0)),
    (&[1, 0, 0, 0, 0, 1, 1, 2, 2, 3], Constant, Some(0.0)),
    (&[1, 2, 0, 0, 0, 0], Circular, None),
    (&[1, 2, 3, 4, 5, 6], Circular, None),
    (&[0, 1, 0, 0, 0, 0], Circular, None),
    (&[0, 0, 0, 0, 0, 0], Circular, None),
    (&[0, 0, -1, -2, 0, 0], Circular, None),
    (&[-1, -2, -1, -2, -1, -2], Circular, None),
    (&[-5, -8, 0, 0, 0, 0], Circular, None),
    (&[10, 10, 10, 10, 10, 10], Circular, None),
];

const PAD2D: &[StaticPad] = &[
    (&[1, 2], Reflect, None),
    (&[1, 0], Reflect, None),
    (&[0, 0], Reflect, None),
    (&[1, 2], Replicate, None),
    (&[1, 0], Replicate, None),
    (&[0, 0], Replicate, None),
    (&[1, 0], Constant, None),
    (&[1, 0], Constant, Some(42.0)),
    (&[1, 0], Constant, Some(-0.57)),
    (&[1, 2, 3, 4], Constant, None),
    (&[1, 2, 3, 4], Constant, Some(42.0)),
    (&[1, 2, 3, 4], Constant, Some(-0.57)),
];

// Identical for every rank.
const PAD_LIST: &[(i32, i32, PadMode, Option<f64>)] = &[
    (2, 0, Reflect, None),
    (0, 2, Reflect, None),
    (10, 10, Reflect, None),
    (0, 0, Reflect, None),
    (5, 3, Reflect, None),
    (2, 0, Replicate, None),
    (0, 2, Replicate, None),
    (10, 10, Replicate, None),
    (5, 3, Replicate, None),
    (0, 0, Replicate, None),
    (2, 0, Constant, None),
    (0, 3, Constant, Some(42.0)),
    (4, 4, Constant, Some(-0.57)),
    (1, 2, Constant, None),
    (0, 0, Constant, Some(-0.57)),
];

/// Static padding cases for rank 2, 4 or 5; empty for any other rank.
pub fn pad_cases(ndim: usize) -> Vec<TestCase> {
    let (suite, table, tiers): (&'static str, &[StaticPad], &'static [Tier]) = match ndim {
        4 => ("pad4d", PAD4D, NIGHTLY_PRECOMMIT),
        5 => ("pad5d", PAD5D, NIGHTLY),
        2 => ("pad2d", PAD2D, NIGHTLY),
        _ => return Vec::new(),
    };
    table
        .iter()
        .map(|&(pads, mode, value)| TestCase {
            suite,
            id: format!(
                "{suite}[pads={}, mode={mode}, value={}]",
                format_tuple(pads),
                format_value(value)
            ),
            tiers,
            params: CaseParams::Pad {
                ndim,
                pads: pads.to_vec(),
                mode,
                value,
            },
        })
        .collect()
}

/// Runtime-width padding cases for rank 2, 4 or 5; empty for any other rank.
pub fn pad_list_cases(ndim: usize) -> Vec<TestCase> {
    let (suite, tiers): (&'static str, &'static [Tier]) = match ndim {
        4 => ("pad_list4d", NIGHTLY_PRECOMMIT),
        5 => ("pad_list5d", NIGHTLY),
        2 => ("pad_list2d", NIGHTLY_PRECOMMIT),
        _ => return Vec::new(),
    };
    PAD_LIST
        .iter()
        .map(|&(pad_w, pad_h, mode, value)| TestCase {
            suite,
            id: format!(
                "{suite}[pad_w={pad_w}, pad_h={pad_h}, mode={mode}, value={}]",
                format_value(value)
            ),
            tiers,
            params: CaseParams::PadList {
                ndim,
                pad_w,
                pad_h,
                mode,
                value,
            },
        })
        .collect()
}
