//! Conversion of traced framework models into IR models.
//!
//! A [`TranslatorTable`] maps every framework operator tag to an
//! [`OpTranslator`] that emits equivalent IR nodes. Conversion walks the
//! traced graph in topological order; a tag without a translator is an error.

mod context;
mod generation;
mod math;
mod pad;

pub use context::TranslateContext;
pub use generation::{CastTranslator, FillAnyLikeTranslator, ListConstructTranslator};
pub use math::{
    AddmmTranslator, FlattenTranslator, FloorDivideTranslator, SoftmaxTranslator, SubTranslator,
};
pub use pad::PadTranslator;

use crate::error::{FrontendError, Result};
use crate::model::FrameworkModel;
use opcheck_core::GraphNode;
use opcheck_ir::{check_ir_version, IrModel, OperatorRegistry, IR_VERSION};
use std::collections::HashMap;
use tracing::{debug, info};

/// Lowers one framework operator into IR nodes.
pub trait OpTranslator: Send + Sync {
    /// Framework operator tag handled by this translator.
    fn op_tag(&self) -> &str;

    /// Emit IR for `node`; returns one IR value per node output.
    fn translate(&self, ctx: &mut TranslateContext<'_>, node: &GraphNode) -> Result<Vec<String>>;
}

/// Framework tag to translator mapping.
pub struct TranslatorTable {
    translators: HashMap<String, Box<dyn OpTranslator>>,
}

impl TranslatorTable {
    /// Table with every built-in translator.
    pub fn new() -> Self {
        let mut table = Self {
            translators: HashMap::new(),
        };
        table.register(Box::new(PadTranslator));
        table.register(Box::new(AddmmTranslator));
        table.register(Box::new(FloorDivideTranslator));
        table.register(Box::new(SubTranslator));
        table.register(Box::new(FlattenTranslator));
        table.register(Box::new(SoftmaxTranslator));
        table.register(Box::new(FillAnyLikeTranslator));
        table.register(Box::new(CastTranslator));
        table.register(Box::new(ListConstructTranslator));
        table
    }

    /// Register or replace a translator.
    pub fn register(&mut self, translator: Box<dyn OpTranslator>) {
        self.translators
            .insert(translator.op_tag().to_string(), translator);
    }

    /// Look up the translator for `op_tag`.
    pub fn get(&self, op_tag: &str) -> Result<&dyn OpTranslator> {
        self.translators
            .get(op_tag)
            .map(|t| t.as_ref())
            .ok_or_else(|| FrontendError::UnsupportedOperator {
                op_tag: op_tag.to_string(),
            })
    }

    /// Sorted list of convertible tags.
    pub fn supported_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.translators.keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl Default for TranslatorTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Converter configuration.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    ir_version: i64,
    producer: String,
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp converted models with `ir_version`.
    pub fn with_ir_version(mut self, ir_version: i64) -> Self {
        self.ir_version = ir_version;
        self
    }

    /// Set the producer name recorded in converted models.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    /// IR version of converted models.
    pub fn ir_version(&self) -> i64 {
        self.ir_version
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            ir_version: IR_VERSION,
            producer: "opcheck-frontend".to_string(),
        }
    }
}

/// Framework model to IR converter.
pub struct Converter {
    table: TranslatorTable,
    options: ConvertOptions,
}

impl Converter {
    /// Converter with the built-in translator table.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            table: TranslatorTable::new(),
            options,
        }
    }

    /// Converter with a custom translator table.
    pub fn with_table(table: TranslatorTable, options: ConvertOptions) -> Self {
        Self { table, options }
    }

    /// Convert `model` into a validated IR model.
    pub fn convert(&self, model: &FrameworkModel) -> Result<IrModel> {
        check_ir_version(self.options.ir_version)?;
        info!(
            "Converting '{}' ({} nodes) to IR v{}",
            model.name,
            model.graph.node_count(),
            self.options.ir_version
        );

        let mut ctx = TranslateContext::new(model);
        for name in model.input_names() {
            ctx.declare_input(name);
        }

        for node in model.graph.execution_order()? {
            let translator = self.table.get(&node.op_type)?;
            let outputs = translator.translate(&mut ctx, node)?;
            if outputs.len() != node.outputs.len() {
                return Err(FrontendError::conversion(
                    &node.op_type,
                    format!(
                        "translator produced {} values for {} outputs",
                        outputs.len(),
                        node.outputs.len()
                    ),
                ));
            }
            debug!("{} -> {:?}", node.op_type, outputs);
            for (framework_name, ir_name) in node.outputs.iter().zip(outputs) {
                ctx.bind(framework_name, ir_name);
            }
        }

        let ir = ctx.finish(self.options.ir_version, &self.options.producer)?;
        ir.validate(&OperatorRegistry::new())?;
        info!(
            "Converted '{}' into {} IR nodes, {} initializers",
            model.name,
            ir.graph.node_count(),
            ir.initializers.len()
        );
        Ok(ir)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}
