//! Chart rendering collaborators
//!
//! The scanner never evaluates chart templates itself. A [`ManifestRenderer`]
//! turns chart content plus merged values into manifest text; the default
//! implementation shells out to `helm template`.

use chartmirror_core::Values;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, ScanError};

/// Everything needed to render one chart
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Chart directory or archive
    pub chart: &'a Path,
    /// Fully merged values
    pub values: &'a Values,
    pub release_name: &'a str,
    pub namespace: &'a str,
    /// Kubernetes version for `.Capabilities`, renderer default if `None`
    pub kube_version: Option<&'a str>,
}

/// Renders a chart into multi-document manifest text
pub trait ManifestRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String>;
}

/// Renders through the `helm template` command
#[derive(Debug, Clone)]
pub struct HelmTemplateRenderer {
    binary: PathBuf,
}

impl Default for HelmTemplateRenderer {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("helm"),
        }
    }
}

impl HelmTemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific helm binary instead of the one on `PATH`
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Command-line arguments for a request; values are read from stdin
    pub fn args(&self, request: &RenderRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "template".into(),
            request.release_name.into(),
            request.chart.as_os_str().to_owned(),
            "--namespace".into(),
            request.namespace.into(),
        ];
        if let Some(kube_version) = request.kube_version {
            args.push("--kube-version".into());
            args.push(kube_version.into());
        }
        args.push("--values".into());
        args.push("-".into());
        args
    }
}

impl ManifestRenderer for HelmTemplateRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String> {
        let values = request.values.to_yaml()?;

        let mut child = Command::new(&self.binary)
            .args(self.args(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ScanError::RendererSpawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        // Dropping stdin closes the pipe so helm sees EOF. helm may exit
        // before reading it, so its status and stderr take precedence.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(values.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.binary.display(), output.status)
            } else {
                stderr
            };
            return Err(ScanError::Render { message });
        }
        written?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Pre-rendered manifest text, e.g. saved `helm template` output
#[derive(Debug, Clone, Default)]
pub struct StaticManifest(pub String);

impl StaticManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self(std::fs::read_to_string(path)?))
    }
}

impl ManifestRenderer for StaticManifest {
    fn render(&self, _request: &RenderRequest<'_>) -> Result<String> {
        Ok(self.0.clone())
    }
}
