//! Reading and writing serialized IR models.
//!
//! Models are stored as JSON. Writing takes an explicit IR version so the
//! harness can round-trip a model through an older format before running it.

use crate::error::{IrError, Result};
use crate::model::{check_ir_version, IrModel};
use crate::ops::OperatorRegistry;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Loads serialized IR models
pub struct ModelLoader;

impl ModelLoader {
    /// Load a model from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<IrModel> {
        info!("Loading IR model from: {:?}", path.as_ref());
        let bytes = fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }

    /// Load a model from bytes
    pub fn load_from_bytes(bytes: &[u8]) -> Result<IrModel> {
        let mut model: IrModel = serde_json::from_slice(bytes)
            .map_err(|e| IrError::ParseError(format!("malformed model: {e}")))?;

        check_ir_version(model.ir_version)?;
        info!(
            "IR model version {} from '{}' with {} nodes",
            model.ir_version,
            model.producer,
            model.graph.node_count()
        );

        model
            .graph
            .rebuild_edges()
            .map_err(|e| IrError::InvalidGraph(e.to_string()))?;
        model.validate(&OperatorRegistry::new())?;

        for (name, init) in &model.initializers {
            debug!("Initializer {}: {} {:?}", name, init.dtype, init.shape);
        }
        Ok(model)
    }
}

/// Writes IR models at a chosen IR version
pub struct ModelSerializer;

impl ModelSerializer {
    /// Serialize `model` as IR version `ir_version`.
    ///
    /// Version 10 predates source-operator provenance, so that list is
    /// omitted when writing it.
    pub fn to_bytes(model: &IrModel, ir_version: i64) -> Result<Vec<u8>> {
        check_ir_version(ir_version)?;
        let mut stamped = model.clone();
        stamped.ir_version = ir_version;
        if ir_version < 11 {
            stamped.source_ops.clear();
        }
        Ok(serde_json::to_vec_pretty(&stamped)?)
    }

    /// Serialize to a file.
    pub fn save_to_file<P: AsRef<Path>>(model: &IrModel, path: P, ir_version: i64) -> Result<()> {
        let bytes = Self::to_bytes(model, ir_version)?;
        fs::write(path.as_ref(), bytes)?;
        debug!("Wrote IR v{} model to {:?}", ir_version, path.as_ref());
        Ok(())
    }
}
