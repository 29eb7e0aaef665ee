//! Tensor operations grouped by concern.

pub mod arithmetic;
pub mod matrix;
pub mod padding;
pub mod reduction;
pub mod shape;

pub use arithmetic::ArithmeticOps;
pub use matrix::MatrixOps;
pub use padding::{PadMode, PadOps};
pub use reduction::ReductionOps;
pub use shape::ShapeOps;
