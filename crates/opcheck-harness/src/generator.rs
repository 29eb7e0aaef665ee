//! `fill_any_like` artifact generator.
//!
//! Produces one artifact directory per variant in [`FILL_VARIANTS`]. All
//! float-input variants share one sampled `x`; the boolean variant samples
//! its own input.

use crate::artifact::save_artifact;
use crate::cases::{FillInput, FILL_VARIANTS};
use crate::error::Result;
use crate::provision::{InputProvisioner, ProvisionConfig};
use opcheck_core::Tensor;
use opcheck_frontend::{trace_module, FillAnyLikeModule, Module};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Feed name of every generated model.
pub const FEED_KEY: &str = "x";

/// Write every variant under `out_dir`; returns the artifact directories.
pub fn generate_fill_any_like(out_dir: &Path, provision: ProvisionConfig) -> Result<Vec<PathBuf>> {
    let mut provisioner = InputProvisioner::new(provision)?;
    let mut inputs: HashMap<FillInput, Tensor> = HashMap::new();
    let mut written = Vec::with_capacity(FILL_VARIANTS.len());

    for variant in FILL_VARIANTS.iter() {
        let x = match inputs.get(&variant.input) {
            Some(x) => x.clone(),
            None => {
                let x = provisioner.sample(variant.input.shape(), variant.input.dtype())?;
                inputs.insert(variant.input, x.clone());
                x
            }
        };

        let module = FillAnyLikeModule::new(variant.value, variant.dtype);
        let outputs = module.forward(std::slice::from_ref(&x))?;
        let model = trace_module(&module, variant.name, &[(FEED_KEY.to_string(), x.clone())])?;
        written.push(save_artifact(out_dir, &model, &[x], &outputs)?);
    }

    info!("Generated {} artifacts in {}", written.len(), out_dir.display());
    Ok(written)
}
