//! Images command - list the container images a chart uses

use chartmirror_core::Values;
use chartmirror_scan::{
    HelmTemplateRenderer, ImageScanner, ManifestRenderer, ScanMode, ScanOutcome, ScanRequest,
    StaticManifest,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::MirrorConfig;
use crate::display;
use crate::error::{CliError, Result};

pub struct ImagesOptions<'a> {
    pub chart: &'a Path,
    pub values_files: &'a [PathBuf],
    pub set_values: &'a [String],
    pub manifest: Option<&'a Path>,
    pub mode: ScanMode,
    pub release_name: Option<&'a str>,
    pub namespace: Option<&'a str>,
    pub kube_version: Option<&'a str>,
    pub json: bool,
}

pub fn run(options: &ImagesOptions<'_>, config: &MirrorConfig) -> Result<()> {
    let defaults = load_chart_values(options.chart)?;
    let overrides = super::load_overrides(options.values_files, options.set_values)?;

    let renderer: Box<dyn ManifestRenderer> = match options.manifest {
        Some(path) => Box::new(StaticManifest::from_file(path).map_err(|e| {
            CliError::input(format!("Failed to read manifest {}: {}", path.display(), e))
        })?),
        None => Box::new(HelmTemplateRenderer::with_binary(&config.render.helm)),
    };

    let request = ScanRequest {
        chart: options.chart,
        defaults: &defaults,
        overrides: &overrides,
        release_name: options
            .release_name
            .unwrap_or(&config.render.release_name),
        namespace: options.namespace.unwrap_or(&config.render.namespace),
        kube_version: options
            .kube_version
            .or(config.render.kube_version.as_deref()),
    };

    let outcome = ImageScanner::new(options.mode).scan(&request, renderer.as_ref())?;

    if options.json {
        let report = JsonReport::new(options.chart, &outcome);
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::internal(format!("Failed to serialize report: {}", e)))?;
        println!("{}", json);
    } else {
        display::print_scan(options.chart, &outcome);
    }

    Ok(())
}

/// Load `<chart>/values.yaml`; a chart without one has an empty tree
fn load_chart_values(chart: &Path) -> Result<Values> {
    if !chart.is_dir() {
        return Err(CliError::input_with_help(
            format!("Chart directory not found: {}", chart.display()),
            "Pass the path of an unpacked chart (the directory holding Chart.yaml)",
        ));
    }

    let values_path = chart.join("values.yaml");
    if !values_path.exists() {
        tracing::debug!("{} has no values.yaml", chart.display());
        return Ok(Values::new());
    }

    Values::from_file(&values_path).map_err(|e| {
        CliError::input(format!("Failed to load {}: {}", values_path.display(), e))
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    chart: String,
    strategy: chartmirror_scan::Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    render_error: Option<String>,
    skipped: usize,
    images: Vec<JsonImage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonImage {
    reference: String,
    #[serde(flatten)]
    image: chartmirror_core::ImageIdentity,
    paths: Vec<String>,
}

impl JsonReport {
    fn new(chart: &Path, outcome: &ScanOutcome) -> Self {
        Self {
            chart: chart.display().to_string(),
            strategy: outcome.strategy,
            render_error: outcome.render_error.clone(),
            skipped: outcome.discovery.skipped(),
            images: outcome
                .discovery
                .findings()
                .map(|finding| JsonImage {
                    reference: finding.image.reference(),
                    image: finding.image.clone(),
                    paths: finding.paths.clone(),
                })
                .collect(),
        }
    }
}
