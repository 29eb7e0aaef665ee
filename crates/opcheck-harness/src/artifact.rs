//! On-disk model artifacts.
//!
//! ```text
//! <out>/<name>/model.json     traced framework model (feed keys, fetch list)
//! <out>/<name>/input<i>.npy   bundled inputs
//! <out>/<name>/output<i>.npy  bundled reference outputs
//! <out>/<name>/manifest.json  name, feeds, fetches and array specs
//! ```

use crate::compare::compare_outputs;
use crate::driver::{CaseStatus, Driver};
use crate::error::{HarnessError, Result};
use opcheck_core::{DataType, Tensor};
use opcheck_frontend::FrameworkModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Model file name inside an artifact directory.
pub const MODEL_FILE: &str = "model.json";
/// Manifest file name inside an artifact directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Logical description of one stored array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayEntry {
    /// File name relative to the artifact directory.
    pub file: String,
    /// Logical element type.
    pub dtype: DataType,
    /// Dimensions.
    pub shape: Vec<usize>,
}

impl ArrayEntry {
    fn describe(file: String, tensor: &Tensor) -> Self {
        Self {
            file,
            dtype: tensor.dtype(),
            shape: tensor.shape(),
        }
    }
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Artifact name.
    pub name: String,
    /// Feed names, in order.
    pub feed_keys: Vec<String>,
    /// Fetch names, in order.
    pub fetch_list: Vec<String>,
    /// Stored inputs.
    pub inputs: Vec<ArrayEntry>,
    /// Stored outputs.
    pub outputs: Vec<ArrayEntry>,
}

/// A loaded artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Parsed manifest.
    pub manifest: Manifest,
    /// Framework model.
    pub model: FrameworkModel,
    /// Bundled inputs.
    pub inputs: Vec<Tensor>,
    /// Bundled outputs.
    pub outputs: Vec<Tensor>,
}

/// Write `model` with its inputs and outputs under `out_dir/<model.name>`.
pub fn save_artifact(
    out_dir: &Path,
    model: &FrameworkModel,
    inputs: &[Tensor],
    outputs: &[Tensor],
) -> Result<PathBuf> {
    if inputs.len() != model.input_names().len() || outputs.len() != model.output_names().len() {
        return Err(HarnessError::Artifact(format!(
            "{} has {} feeds and {} fetches, got {} inputs and {} outputs",
            model.name,
            model.input_names().len(),
            model.output_names().len(),
            inputs.len(),
            outputs.len()
        )));
    }

    let dir = out_dir.join(&model.name);
    fs::create_dir_all(&dir)?;
    model.save_to_file(dir.join(MODEL_FILE))?;

    let mut manifest = Manifest {
        name: model.name.clone(),
        feed_keys: model.input_names().to_vec(),
        fetch_list: model.output_names().to_vec(),
        inputs: Vec::with_capacity(inputs.len()),
        outputs: Vec::with_capacity(outputs.len()),
    };
    for (i, tensor) in inputs.iter().enumerate() {
        let file = format!("input{i}.npy");
        tensor.write_npy(dir.join(&file))?;
        manifest.inputs.push(ArrayEntry::describe(file, tensor));
    }
    for (i, tensor) in outputs.iter().enumerate() {
        let file = format!("output{i}.npy");
        tensor.write_npy(dir.join(&file))?;
        manifest.outputs.push(ArrayEntry::describe(file, tensor));
    }
    fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

    info!("Saved artifact {} to {}", model.name, dir.display());
    Ok(dir)
}

/// Read an artifact directory back.
pub fn load_artifact(dir: &Path) -> Result<Artifact> {
    let manifest: Manifest = serde_json::from_slice(&fs::read(dir.join(MANIFEST_FILE))?)?;
    let model = FrameworkModel::load_from_file(dir.join(MODEL_FILE))?;
    if manifest.feed_keys != model.input_names() || manifest.fetch_list != model.output_names() {
        return Err(HarnessError::Artifact(format!(
            "manifest of {} disagrees with its model's feeds or fetches",
            manifest.name
        )));
    }

    let read = |entries: &[ArrayEntry]| -> Result<Vec<Tensor>> {
        entries
            .iter()
            .map(|entry| {
                let tensor = Tensor::read_npy(dir.join(&entry.file), entry.dtype)?;
                if tensor.shape() != entry.shape {
                    return Err(HarnessError::Artifact(format!(
                        "{} has shape {:?}, manifest says {:?}",
                        entry.file,
                        tensor.shape(),
                        entry.shape
                    )));
                }
                Ok(tensor)
            })
            .collect()
    };
    let inputs = read(&manifest.inputs)?;
    let outputs = read(&manifest.outputs)?;
    debug!("Loaded artifact {} from {}", manifest.name, dir.display());

    Ok(Artifact {
        manifest,
        model,
        inputs,
        outputs,
    })
}

/// Re-execute a saved artifact: the framework model must reproduce its
/// bundled outputs, then the converted model is checked against them.
pub fn replay_artifact(dir: &Path, driver: &Driver) -> Result<CaseStatus> {
    let artifact = load_artifact(dir)?;
    let replayed = artifact.model.run(&artifact.inputs)?;
    let tolerance = driver.config().effective_tolerance();
    if let Some(mismatch) = compare_outputs(&artifact.outputs, &replayed, tolerance)? {
        return Ok(CaseStatus::Failed(mismatch));
    }
    Ok(driver.check_traced(&artifact.model, &artifact.inputs, &artifact.outputs))
}
