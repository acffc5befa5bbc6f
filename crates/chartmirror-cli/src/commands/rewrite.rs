//! Rewrite command - point a values file's images at a mirror registry

use chartmirror_core::Values;
use chartmirror_scan::RegistryRewriter;
use std::path::Path;

use crate::config::MirrorConfig;
use crate::display;
use crate::error::{CliError, Result};

pub fn run(
    values_path: &Path,
    registry: Option<&str>,
    prefix_source: Option<bool>,
    output: Option<&Path>,
    config: &MirrorConfig,
) -> Result<()> {
    let destination = registry
        .or(config.registry.as_deref())
        .ok_or_else(|| {
            CliError::input_with_help(
                "No destination registry given",
                "Pass --registry or set `registry` in the config file",
            )
        })?;

    let mut values = Values::from_file(values_path).map_err(|e| {
        CliError::input(format!("Failed to load {}: {}", values_path.display(), e))
    })?;

    let rewriter = RegistryRewriter::new(destination)
        .prefix_source(prefix_source.unwrap_or(config.prefix_source));
    let report = rewriter.rewrite_values(&mut values);

    let yaml = values
        .to_yaml()
        .map_err(|e| CliError::internal(format!("Failed to serialize values: {}", e)))?;

    match output {
        Some(path) => {
            std::fs::write(path, yaml)?;
            display::print_rewrite(rewriter.destination(), &report, Some(path));
        }
        None => {
            print!("{}", yaml);
            display::print_rewrite(rewriter.destination(), &report, None);
        }
    }

    Ok(())
}
