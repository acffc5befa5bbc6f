//! Error types for image discovery and rewriting

use chartmirror_core::CoreError;
use thiserror::Error;

/// Scanner errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Chart rendering failed: {message}")]
    Render { message: String },

    #[error("Failed to start renderer '{program}': {source}")]
    RendererSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A gating condition could not be followed through the tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("Condition '{condition}': '{segment}' is {found}, expected a mapping, string or boolean")]
    TypeMismatch {
        condition: String,
        segment: String,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;
