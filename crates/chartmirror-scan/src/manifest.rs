//! Image discovery in rendered Kubernetes manifests
//!
//! Template logic can assemble image strings from fields that never appear
//! under a conventional key (a global default registry, for instance), so the
//! rendered output is the more reliable source. Discovery is structural: any
//! `image` key holding a string counts, whatever the resource kind.

use chartmirror_core::ImageReference;
use serde_yaml::Value as YamlValue;

use crate::discovery::Discovery;
use crate::error::Result;

/// Split multi-document YAML on lines consisting of `---`
pub fn split_documents(manifest: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in manifest.lines() {
        if line.trim_end() == "---" {
            documents.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    documents.push(current);

    documents
}

/// Scans rendered manifests for image references
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestImageFinder;

impl ManifestImageFinder {
    pub fn new() -> Self {
        Self
    }

    /// Find every image referenced in `manifest`
    ///
    /// Documents that fail to parse and image strings that are not valid
    /// references are skipped and counted in [`Discovery::skipped`]. The same
    /// image seen in several places becomes one finding with several paths.
    pub fn find(&self, manifest: &str) -> Result<Discovery> {
        let mut discovery = Discovery::new();

        for document in split_documents(manifest) {
            let document = document.trim();
            if document.is_empty() {
                continue;
            }

            let resource: YamlValue = match serde_yaml::from_str(document) {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!("Skipping unparseable manifest document: {}", e);
                    discovery.note_skipped();
                    continue;
                }
            };

            match resource {
                YamlValue::Mapping(_) => {}
                // Comment-only documents
                YamlValue::Null => continue,
                _ => {
                    tracing::debug!("Skipping manifest document that is not a mapping");
                    discovery.note_skipped();
                    continue;
                }
            }

            let mut images = Vec::new();
            collect_images(&resource, &mut images);

            for image in images {
                match ImageReference::parse(image) {
                    Ok(reference) => discovery.record(
                        reference.canonical(),
                        reference.to_identity(),
                        resource_path(&resource, image),
                    ),
                    Err(e) => {
                        tracing::debug!("Skipping image reference: {}", e);
                        discovery.note_skipped();
                    }
                }
            }
        }

        Ok(discovery)
    }
}

/// Collect every non-empty string under an `image` key, at any depth
fn collect_images<'a>(node: &'a YamlValue, images: &mut Vec<&'a str>) {
    match node {
        YamlValue::Mapping(mapping) => {
            for (key, value) in mapping {
                if key.as_str() == Some("image") {
                    if let Some(image) = value.as_str().filter(|s| !s.is_empty()) {
                        images.push(image);
                    }
                } else {
                    collect_images(value, images);
                }
            }
        }
        YamlValue::Sequence(items) => {
            for item in items {
                collect_images(item, images);
            }
        }
        YamlValue::Tagged(tagged) => collect_images(&tagged.value, images),
        _ => {}
    }
}

/// `<kind>/<name>/image=<image>`, with `unknown` for missing parts
fn resource_path(resource: &YamlValue, image: &str) -> String {
    let kind = resource
        .get("kind")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    let name = resource
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    format!("{}/{}/image={}", kind, name, image)
}
