//! Point the image fields of a configuration tree at a mirror registry

use chartmirror_core::image::source_label;
use chartmirror_core::values::Tree;
use chartmirror_core::{ImageReference, Values};
use serde_json::Value as JsonValue;

use crate::join_path;

/// Paths touched by a rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Fields that now point at the destination registry
    pub rewritten: Vec<String>,
    /// `image`/`repository` strings left untouched because they did not parse
    pub skipped: Vec<String>,
}

/// Rewrites registry and repository fields in place
///
/// Each mapping is handled by the first rule that applies, and children are
/// only visited when none does:
/// 1. `registry` string: replaced by the destination; with source prefixing,
///    a sibling `repository` becomes `<source-label>/<repository>`
/// 2. `image` string: parsed and re-rooted under the destination
/// 3. `repository` string: same as `image`
///
/// Fields already pointing at the destination are left alone, so running
/// the rewriter twice gives the same tree.
#[derive(Debug, Clone)]
pub struct RegistryRewriter {
    destination: String,
    prefix_source: bool,
}

impl RegistryRewriter {
    /// Create a rewriter for `destination`; an `oci://` scheme is dropped
    pub fn new(destination: &str) -> Self {
        let destination = destination.strip_prefix("oci://").unwrap_or(destination);
        Self {
            destination: destination.trim_end_matches('/').to_string(),
            prefix_source: false,
        }
    }

    /// Keep the source registry's first DNS label as a path segment
    /// (`docker.io/library/nginx` → `<destination>/docker/library/nginx`)
    pub fn prefix_source(mut self, prefix_source: bool) -> Self {
        self.prefix_source = prefix_source;
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Rewrite a configuration tree in place
    pub fn rewrite(&self, data: &mut Tree) -> RewriteReport {
        let mut report = RewriteReport::default();
        self.walk(data, "", &mut report);
        report
    }

    /// Rewrite a whole [`Values`] tree; non-mapping roots are left alone
    pub fn rewrite_values(&self, values: &mut Values) -> RewriteReport {
        match values.tree_mut() {
            Some(tree) => self.rewrite(tree),
            None => RewriteReport::default(),
        }
    }

    fn walk(&self, data: &mut Tree, prefix: &str, report: &mut RewriteReport) {
        let registry = match data.get("registry") {
            Some(JsonValue::String(old)) => Some(old.clone()),
            _ => None,
        };
        if let Some(old) = registry {
            self.rewrite_split(data, &old, prefix, report);
            return;
        }

        for key in ["image", "repository"] {
            if let Some(JsonValue::String(value)) = data.get_mut(key) {
                let path = join_path(prefix, key);
                match ImageReference::parse(value) {
                    Ok(reference) => {
                        if let Some(rewritten) = self.convert(value, &reference) {
                            *value = rewritten;
                            report.rewritten.push(path);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Leaving {} untouched: {}", path, e);
                        report.skipped.push(path);
                    }
                }
                return;
            }
        }

        for (key, value) in data.iter_mut() {
            if let JsonValue::Object(nested) = value {
                self.walk(nested, &join_path(prefix, key), report);
            }
        }
    }

    fn rewrite_split(&self, data: &mut Tree, old: &str, prefix: &str, report: &mut RewriteReport) {
        if old == self.destination {
            return;
        }

        data.insert(
            "registry".to_string(),
            JsonValue::String(self.destination.clone()),
        );
        report.rewritten.push(join_path(prefix, "registry"));

        let label = source_label(old);
        if !self.prefix_source || label.is_empty() {
            return;
        }
        if let Some(JsonValue::String(repository)) = data.get_mut("repository") {
            *repository = format!("{}/{}", label, repository);
            report.rewritten.push(join_path(prefix, "repository"));
        }
    }

    /// Re-root one reference under the destination, `None` if already there
    fn convert(&self, original: &str, reference: &ImageReference) -> Option<String> {
        if original.starts_with(&format!("{}/", self.destination)) {
            return None;
        }

        let destination = if self.prefix_source {
            format!("{}/{}", self.destination, reference.source_label())
        } else {
            self.destination.clone()
        };

        Some(format!("{}/{}", destination, reference.path()))
    }
}
