//! Chartmirror Scan - find and rewrite container images in Helm charts
//!
//! Two discovery strategies share one result type:
//! - [`ValueTreeImageFinder`] walks a chart's configuration tree, recognizing
//!   image fields by key name and skipping disabled branches
//! - [`ManifestImageFinder`] scans rendered manifests for `image` keys at any depth
//!
//! [`ImageScanner`] prefers the rendered manifests and falls back to the
//! configuration tree when rendering fails. [`RegistryRewriter`] points the
//! image fields of a tree at a mirror registry.

pub mod condition;
pub mod discovery;
pub mod error;
pub mod finder;
pub mod manifest;
pub mod render;
pub mod rewrite;
pub mod scanner;

pub use condition::{condition_met, evaluate};
pub use discovery::{Discovery, ImageFinding};
pub use error::{ConditionError, Result, ScanError};
pub use finder::{ValueTreeImageFinder, find_image_references};
pub use manifest::{ManifestImageFinder, split_documents};
pub use render::{HelmTemplateRenderer, ManifestRenderer, RenderRequest, StaticManifest};
pub use rewrite::{RegistryRewriter, RewriteReport};
pub use scanner::{ImageScanner, ScanMode, ScanOutcome, ScanRequest, Strategy};

/// Join a dotted tree path, leaving the root level unprefixed
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Join an origin key, escaping dots and backslashes inside `key`
///
/// Unlike [`join_path`], distinct key sequences never produce the same
/// string, so `{"a.b": ..}` and `{a: {b: ..}}` stay apart.
pub(crate) fn join_origin(prefix: &str, key: &str) -> String {
    let escaped = key.replace('\\', "\\\\").replace('.', "\\.");
    join_path(prefix, &escaped)
}
