//! opcheck core
//!
//! Foundational pieces shared by every opcheck crate: a Candle-backed
//! [`Tensor`] with a logical [`DataType`], the [`ModelGraph`] container used
//! for both framework-native and IR models, and tensor operations with the
//! framework's semantics (padding, matrix products, reshapes, softmax).
//!
//! ## Example
//!
//! ```rust
//! use opcheck_core::{DataType, PadMode, PadOps, Tensor};
//!
//! let x = Tensor::zeros(vec![2, 3], DataType::F32)?;
//! let padded = x.pad(&[1, 0], PadMode::Constant, 0.0)?;
//! assert_eq!(padded.shape(), vec![2, 4]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod graph;
pub mod logging;
pub mod ops;
pub mod tensor;
pub mod types;

pub use error::{CoreError, Result};
pub use graph::GraphBuilder;
pub use ops::{ArithmeticOps, MatrixOps, PadMode, PadOps, ReductionOps, ShapeOps};
pub use tensor::Tensor;
pub use types::{
    DataType, GraphEdge, GraphNode, ModelGraph, NodeAttribute, NodeId, TensorData, TensorSpec,
};
