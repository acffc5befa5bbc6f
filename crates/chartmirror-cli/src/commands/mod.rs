//! CLI commands

pub mod images;
pub mod rewrite;

use chartmirror_core::Values;
use std::path::PathBuf;

use crate::error::{CliError, Result};

/// Merge `-f` files in order, then `--set` arguments on top
pub(crate) fn load_overrides(values_files: &[PathBuf], set_values: &[String]) -> Result<Values> {
    let mut layers = Vec::with_capacity(values_files.len() + 1);

    for values_file in values_files {
        let file_values = Values::from_file(values_file).map_err(|e| {
            CliError::input(format!(
                "Failed to load values file {}: {}",
                values_file.display(),
                e
            ))
        })?;
        layers.push(file_values);
        tracing::debug!("Loaded values from {}", values_file.display());
    }

    if !set_values.is_empty() {
        layers.push(chartmirror_core::parse_set_values(set_values)?);
        tracing::debug!("Applied {} --set values", set_values.len());
    }

    Ok(Values::merge_all(layers))
}
