//! Static image discovery in a chart's configuration tree
//!
//! Charts lay out image coordinates in many shapes, for example:
//!
//! ```yaml
//! image:
//!   registry: docker.io
//!   repository: bitnami/redis
//!   tag: 7.2.4
//! metrics:
//!   enabled: false
//!   image:
//!     repository: bitnami/redis-exporter
//! ```
//!
//! The finder recognizes image fields by key name at every level, assembles
//! one [`ImageIdentity`] per mapping that carries them, and does not descend
//! into branches whose `enabled` flag is off.

use chartmirror_core::ImageIdentity;
use chartmirror_core::values::Tree;
use serde_json::Value as JsonValue;

use crate::condition;
use crate::discovery::Discovery;
use crate::{join_origin, join_path};

/// Image-bearing keys and the identity field each one fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageField {
    Registry,
    Repository,
    Tag,
    Digest,
}

impl ImageField {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "registry" => Some(Self::Registry),
            "repository" | "image" => Some(Self::Repository),
            "tag" => Some(Self::Tag),
            "digest" | "sha" => Some(Self::Digest),
            _ => None,
        }
    }

    fn assign(self, image: &mut ImageIdentity, value: &str) {
        let field = match self {
            Self::Registry => &mut image.registry,
            Self::Repository => &mut image.repository,
            Self::Tag => &mut image.tag,
            Self::Digest => &mut image.digest,
        };
        *field = value.to_string();
    }
}

/// Walks a configuration tree in lock-step with an override tree
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTreeImageFinder {
    use_overrides: bool,
}

impl ValueTreeImageFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer string values from the override tree over the chart's own
    pub fn use_overrides(mut self, use_overrides: bool) -> Self {
        self.use_overrides = use_overrides;
        self
    }

    /// Find image references starting at the root of `data`
    ///
    /// `overrides` is consulted for `enabled` gates and, when
    /// [`use_overrides`](Self::use_overrides) is set, for field values.
    pub fn find(&self, data: &Tree, overrides: &Tree) -> Discovery {
        self.find_with_prefix(data, overrides, "")
    }

    /// Find image references, prefixing every provenance path with `prefix`
    pub fn find_with_prefix(&self, data: &Tree, overrides: &Tree, prefix: &str) -> Discovery {
        let mut discovery = Discovery::new();
        self.walk(data, Some(overrides), prefix, prefix, &mut discovery);
        discovery
    }

    fn walk(
        &self,
        data: &Tree,
        overrides: Option<&Tree>,
        prefix: &str,
        origin: &str,
        out: &mut Discovery,
    ) {
        let mut image = ImageIdentity::default();
        let mut paths = Vec::new();
        let mut branches = Vec::new();

        for (key, value) in data {
            match value {
                JsonValue::Bool(use_digest) if key == "useDigest" => image.use_digest = *use_digest,
                JsonValue::String(own) => {
                    let Some(field) = ImageField::from_key(key) else {
                        continue;
                    };
                    field.assign(&mut image, self.pick(key, own, overrides));
                    paths.push(join_path(prefix, key));
                }
                JsonValue::Object(nested) => {
                    let nested_overrides = overrides
                        .and_then(|o| o.get(key))
                        .and_then(JsonValue::as_object);
                    let path = join_path(prefix, key);

                    if branch_enabled(nested, nested_overrides) {
                        branches.push((path, join_origin(origin, key), nested, nested_overrides));
                    } else {
                        tracing::debug!("Skipping disabled branch {}", path);
                    }
                }
                _ => {}
            }
        }

        for path in paths {
            out.record(origin, image.clone(), path);
        }

        for (path, nested_origin, nested, nested_overrides) in branches {
            self.walk(nested, nested_overrides, &path, &nested_origin, out);
        }
    }

    fn pick<'a>(&self, key: &str, own: &'a str, overrides: Option<&'a Tree>) -> &'a str {
        if !self.use_overrides {
            return own;
        }
        match overrides.and_then(|o| o.get(key)) {
            Some(JsonValue::String(custom)) => custom.as_str(),
            _ => own,
        }
    }
}

/// Decide whether a nested branch should be walked
///
/// A string `enabled` is compared with `"true"`. A boolean `enabled` is
/// evaluated against the override subtree when it carries the flag, and
/// against the branch itself otherwise. Branches without the flag are enabled.
fn branch_enabled(nested: &Tree, overrides: Option<&Tree>) -> bool {
    match nested.get("enabled") {
        Some(JsonValue::String(flag)) => flag == "true",
        Some(JsonValue::Bool(_)) => {
            let scope = overrides
                .filter(|o| o.contains_key("enabled"))
                .unwrap_or(nested);
            condition::condition_met("enabled", scope)
        }
        _ => true,
    }
}

/// Find image references in `data`, consulting `overrides` as described on
/// [`ValueTreeImageFinder::find`]
pub fn find_image_references(data: &Tree, overrides: &Tree, use_overrides: bool) -> Discovery {
    ValueTreeImageFinder::new()
        .use_overrides(use_overrides)
        .find(data, overrides)
}
