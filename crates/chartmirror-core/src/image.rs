//! Container image identities and reference parsing
//!
//! Reference strings are parsed with `oci_distribution::Reference`, which
//! applies Docker Hub normalization (`nginx` becomes `docker.io/library/nginx`).

use oci_distribution::Reference;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Registry, repository, tag and digest of one container image
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIdentity {
    /// Pull by digest instead of tag
    #[serde(default)]
    pub use_digest: bool,
    /// Registry host, possibly with a port (e.g. `docker.io`)
    #[serde(default)]
    pub registry: String,
    /// Repository path (e.g. `library/nginx`)
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub digest: String,
}

impl ImageIdentity {
    /// Parse an image reference string into an identity
    pub fn parse(image: &str) -> Result<Self> {
        ImageReference::parse(image).map(|reference| reference.to_identity())
    }

    /// True when no field has been filled in
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
            && self.repository.is_empty()
            && self.tag.is_empty()
            && self.digest.is_empty()
    }

    /// Render as `registry/repository[:tag][@digest]`
    ///
    /// When `use_digest` is set and a digest is known, the tag is omitted.
    pub fn reference(&self) -> String {
        let mut out = String::new();
        if !self.registry.is_empty() {
            out.push_str(&self.registry);
            out.push('/');
        }
        out.push_str(&self.repository);

        let pin_digest = !self.digest.is_empty() && (self.use_digest || self.tag.is_empty());
        if !self.tag.is_empty() && !(self.use_digest && !self.digest.is_empty()) {
            out.push(':');
            out.push_str(&self.tag);
        }
        if pin_digest {
            out.push('@');
            out.push_str(&self.digest);
        }
        out
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// A parsed, normalized image reference
#[derive(Debug, Clone)]
pub struct ImageReference {
    reference: Reference,
    explicit_tag: bool,
}

impl ImageReference {
    /// Parse a reference in any of the conventional forms
    /// (`name`, `org/name:tag`, `host:port/org/name@sha256:...`)
    pub fn parse(image: &str) -> Result<Self> {
        let reference =
            Reference::try_from(image).map_err(|e| CoreError::InvalidImageReference {
                reference: image.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            reference,
            explicit_tag: has_explicit_tag(image),
        })
    }

    /// Registry domain, `docker.io` when the string names none
    pub fn domain(&self) -> &str {
        self.reference.registry()
    }

    pub fn repository(&self) -> &str {
        self.reference.repository()
    }

    /// Tag as written in the source string; no implicit `latest`
    pub fn tag(&self) -> Option<&str> {
        if self.explicit_tag {
            self.reference.tag()
        } else {
            None
        }
    }

    pub fn digest(&self) -> Option<&str> {
        self.reference.digest()
    }

    /// First DNS label of the domain, used as a path segment when mirroring
    pub fn source_label(&self) -> &str {
        source_label(self.domain())
    }

    /// Everything after the domain: `repository[:tag][@digest]`
    pub fn path(&self) -> String {
        let mut out = self.repository().to_string();
        if let Some(tag) = self.tag() {
            out.push(':');
            out.push_str(tag);
        }
        if let Some(digest) = self.digest() {
            out.push('@');
            out.push_str(digest);
        }
        out
    }

    /// Fully qualified form: `domain/repository[:tag][@digest]`
    pub fn canonical(&self) -> String {
        format!("{}/{}", self.domain(), self.path())
    }

    pub fn to_identity(&self) -> ImageIdentity {
        let digest = self.digest().unwrap_or_default().to_string();
        ImageIdentity {
            use_digest: !digest.is_empty(),
            registry: self.domain().to_string(),
            repository: self.repository().to_string(),
            tag: self.tag().unwrap_or_default().to_string(),
            digest,
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// First DNS label of a registry host, port removed
///
/// `docker.io` → `docker`, `localhost:5000` → `localhost`
pub fn source_label(host: &str) -> &str {
    let host = host.split(':').next().unwrap_or(host);
    host.split('.').next().unwrap_or(host)
}

fn has_explicit_tag(image: &str) -> bool {
    let name = image.split('@').next().unwrap_or(image);
    let last = name.rsplit('/').next().unwrap_or(name);
    last.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "sha256:9b7c0a8c1f0e2d4b6a8c0e2f4a6b8c0d2e4f6a8b0c2d4e6f8a0b2c4d6e8f0a1b";

    #[test]
    fn test_parse_short_name_normalizes_to_docker_hub() {
        let reference = ImageReference::parse("nginx").unwrap();
        assert_eq!(reference.domain(), "docker.io");
        assert_eq!(reference.repository(), "library/nginx");
        assert_eq!(reference.tag(), None);
        assert_eq!(reference.canonical(), "docker.io/library/nginx");
    }

    #[test]
    fn test_parse_qualified_reference() {
        let image = ImageIdentity::parse("quay.io/jetstack/cert-manager-controller:v1.14.0").unwrap();
        assert_eq!(image.registry, "quay.io");
        assert_eq!(image.repository, "jetstack/cert-manager-controller");
        assert_eq!(image.tag, "v1.14.0");
        assert!(!image.use_digest);
    }

    #[test]
    fn test_parse_digest_sets_use_digest() {
        let image = ImageIdentity::parse(&format!("ghcr.io/org/app@{}", DIGEST)).unwrap();
        assert!(image.use_digest);
        assert_eq!(image.digest, DIGEST);
        assert_eq!(image.tag, "");
        assert_eq!(image.reference(), format!("ghcr.io/org/app@{}", DIGEST));
    }

    #[test]
    fn test_registry_with_port() {
        let reference = ImageReference::parse("localhost:5000/team/app:1.0").unwrap();
        assert_eq!(reference.domain(), "localhost:5000");
        assert_eq!(reference.source_label(), "localhost");
        assert_eq!(reference.tag(), Some("1.0"));
    }

    #[test]
    fn test_invalid_reference() {
        let err = ImageIdentity::parse("Not A Valid Image").unwrap_err();
        assert!(matches!(err, CoreError::InvalidImageReference { .. }));
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label("docker.io"), "docker");
        assert_eq!(source_label("registry.k8s.io"), "registry");
        assert_eq!(source_label("localhost:5000"), "localhost");
        assert_eq!(source_label("myregistry"), "myregistry");
    }

    #[test]
    fn test_identity_reference_prefers_digest_when_pinned() {
        let image = ImageIdentity {
            use_digest: true,
            registry: "docker.io".into(),
            repository: "library/redis".into(),
            tag: "7.2".into(),
            digest: DIGEST.into(),
        };
        assert_eq!(image.reference(), format!("docker.io/library/redis@{}", DIGEST));

        let tagged = ImageIdentity {
            use_digest: false,
            ..image
        };
        assert_eq!(tagged.reference(), "docker.io/library/redis:7.2");
    }

    #[test]
    fn test_identity_without_registry() {
        let image = ImageIdentity {
            repository: "bitnami/nginx".into(),
            tag: "1.25".into(),
            ..Default::default()
        };
        assert_eq!(image.to_string(), "bitnami/nginx:1.25");
        assert!(!image.is_empty());
        assert!(ImageIdentity::default().is_empty());
    }
}
