//! Discovery results shared by both finders

use chartmirror_core::ImageIdentity;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// One image and every place it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFinding {
    pub image: ImageIdentity,
    /// Provenance paths, in discovery order
    pub paths: Vec<String>,
}

/// Images found in a chart, keyed by a stable origin key
///
/// Tree discovery keys findings by the path of the branch that holds the
/// image fields, with dots and backslashes inside keys escaped (`"a.b"` at
/// the root becomes `a\.b`, `a: {b: ..}` stays `a.b`); the provenance paths
/// stay unescaped for display. Manifest discovery keys findings by the
/// canonical image reference. Insertion order is preserved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    findings: IndexMap<String, ImageFinding>,
    #[serde(skip)]
    skipped: usize,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provenance path for the finding at `origin`
    ///
    /// The first identity recorded for an origin is kept; later calls only
    /// add paths. A path already present is not repeated.
    pub fn record(&mut self, origin: impl Into<String>, image: ImageIdentity, path: impl Into<String>) {
        let path = path.into();
        let finding = self
            .findings
            .entry(origin.into())
            .or_insert_with(|| ImageFinding {
                image,
                paths: Vec::new(),
            });
        if !finding.paths.contains(&path) {
            finding.paths.push(path);
        }
    }

    /// Merge another discovery into this one, accumulating paths
    pub fn merge(&mut self, other: Discovery) {
        for (origin, finding) in other.findings {
            for path in finding.paths {
                self.record(origin.clone(), finding.image.clone(), path);
            }
        }
        self.skipped += other.skipped;
    }

    /// Count one document, image or branch dropped by best-effort scanning
    pub fn note_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Number of items dropped by best-effort scanning
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn get(&self, origin: &str) -> Option<&ImageFinding> {
        self.findings.get(origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImageFinding)> {
        self.findings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn findings(&self) -> impl Iterator<Item = &ImageFinding> {
        self.findings.values()
    }

    /// Distinct identities by value, in discovery order
    pub fn images(&self) -> Vec<ImageIdentity> {
        self.findings
            .values()
            .map(|f| f.image.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
