//! Strategy selection between rendered manifests and the values tree

use chartmirror_core::Values;
use chartmirror_core::values::Tree;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::discovery::Discovery;
use crate::error::Result;
use crate::finder::ValueTreeImageFinder;
use crate::manifest::ManifestImageFinder;
use crate::render::{ManifestRenderer, RenderRequest};

/// Which finder produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Manifest,
    Values,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Manifest => write!(f, "manifest"),
            Strategy::Values => write!(f, "values"),
        }
    }
}

/// Which strategies the scanner may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Rendered manifests, falling back to the values tree
    #[default]
    Auto,
    /// Values tree only, never render
    ValuesOnly,
    /// Rendered manifests only; a render failure is an error
    ManifestOnly,
}

/// One chart to scan
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest<'a> {
    pub chart: &'a Path,
    /// The chart's own `values.yaml`
    pub defaults: &'a Values,
    /// User-supplied values (files and `--set`)
    pub overrides: &'a Values,
    pub release_name: &'a str,
    pub namespace: &'a str,
    pub kube_version: Option<&'a str>,
}

/// Result of scanning one chart
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub discovery: Discovery,
    pub strategy: Strategy,
    /// Why the manifest strategy was abandoned, if it failed
    pub render_error: Option<String>,
}

/// Finds a chart's images, preferring its rendered output
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageScanner {
    mode: ScanMode,
}

impl ImageScanner {
    pub fn new(mode: ScanMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Scan one chart
    ///
    /// In [`ScanMode::Auto`], a render failure or a rendered output without
    /// any image falls back to the values tree.
    pub fn scan(&self, request: &ScanRequest<'_>, renderer: &dyn ManifestRenderer) -> Result<ScanOutcome> {
        let merged = request.defaults.merged_with(request.overrides);

        if self.mode == ScanMode::ValuesOnly {
            return Ok(values_outcome(request.defaults, &merged, None));
        }

        let render_request = RenderRequest {
            chart: request.chart,
            values: &merged,
            release_name: request.release_name,
            namespace: request.namespace,
            kube_version: request.kube_version,
        };

        match renderer.render(&render_request) {
            Ok(manifest) => {
                let discovery = ManifestImageFinder::new().find(&manifest)?;
                if !discovery.is_empty() || self.mode == ScanMode::ManifestOnly {
                    return Ok(ScanOutcome {
                        discovery,
                        strategy: Strategy::Manifest,
                        render_error: None,
                    });
                }
                tracing::warn!(
                    "No images in rendered manifests of {}, falling back to values",
                    request.chart.display()
                );
                Ok(values_outcome(request.defaults, &merged, None))
            }
            Err(e) if self.mode == ScanMode::ManifestOnly => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Rendering {} failed, falling back to values: {}",
                    request.chart.display(),
                    e
                );
                Ok(values_outcome(
                    request.defaults,
                    &merged,
                    Some(e.to_string()),
                ))
            }
        }
    }
}

/// Walk the chart defaults, with merged values as the override tree so
/// gates and user-supplied fields both take effect
fn values_outcome(defaults: &Values, merged: &Values, render_error: Option<String>) -> ScanOutcome {
    let empty = Tree::new();
    let data = defaults.tree().unwrap_or(&empty);
    let overrides = merged.tree().unwrap_or(&empty);

    ScanOutcome {
        discovery: ValueTreeImageFinder::new()
            .use_overrides(true)
            .find(data, overrides),
        strategy: Strategy::Values,
        render_error,
    }
}
