//! CLI configuration
//!
//! Stored in `~/.config/chartmirror/config.yaml`:
//!
//! ```yaml
//! registry: oci://mirror.example.com
//! prefixSource: true
//! render:
//!   helm: /usr/local/bin/helm
//!   releaseName: release
//!   namespace: default
//!   kubeVersion: "1.29.0"
//! ```
//!
//! Command-line flags take precedence over every field.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    /// Default destination registry for `rewrite`
    #[serde(default)]
    pub registry: Option<String>,

    /// Keep the source registry's first label as a path segment
    #[serde(default)]
    pub prefix_source: bool,

    #[serde(default)]
    pub render: RenderConfig,
}

/// How charts are rendered for manifest-based discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    #[serde(default = "default_helm")]
    pub helm: PathBuf,

    #[serde(default = "default_release_name")]
    pub release_name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub kube_version: Option<String>,
}

fn default_helm() -> PathBuf {
    PathBuf::from("helm")
}

fn default_release_name() -> String {
    "release".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            helm: default_helm(),
            release_name: default_release_name(),
            namespace: default_namespace(),
            kube_version: None,
        }
    }
}

impl MirrorConfig {
    /// Load from an explicit path, or from the default location if present
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| CliError::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get default configuration path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chartmirror").join("config.yaml"))
    }
}
