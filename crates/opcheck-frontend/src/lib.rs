//! opcheck frontend
//!
//! The framework side of the harness: eager kernels with the framework's
//! operator semantics, single-operator [`Module`]s, a [`Tracer`] that records
//! them into a [`FrameworkModel`], and the [`Converter`] that lowers traced
//! models into the IR.
//!
//! ```rust
//! use opcheck_core::{DataType, PadMode, Tensor};
//! use opcheck_frontend::{trace_module, Converter, Module, PadModule};
//!
//! let module = PadModule::new(vec![1, 1], PadMode::Reflect, None);
//! let x = Tensor::zeros(vec![2, 4], DataType::F32)?;
//! let traced = trace_module(&module, "pad", &[("x".to_string(), x)])?;
//! assert!(traced.contains_op(module.op_tag()));
//!
//! let ir = Converter::default().convert(&traced)?;
//! assert!(ir.graph.find_nodes_by_op("Pad").len() == 1);
//! # Ok::<(), opcheck_frontend::FrontendError>(())
//! ```

#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod functional;
pub mod kernels;
pub mod model;
pub mod module;
pub mod modules;
pub mod tracer;

pub use convert::{ConvertOptions, Converter, OpTranslator, TranslateContext, TranslatorTable};
pub use error::{FrontendError, Result};
pub use kernels::KernelRegistry;
pub use model::FrameworkModel;
pub use module::Module;
pub use modules::{AddmmModule, FillAnyLikeModule, ListPadModule, PadModule};
pub use tracer::{trace_module, Tracer};
