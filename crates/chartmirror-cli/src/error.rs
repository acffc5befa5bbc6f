//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use chartmirror_core::CoreError;
use chartmirror_scan::ScanError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// User input could not be used (values files, --set, flags)
    #[error("Invalid input: {message}")]
    #[diagnostic(code(chartmirror::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Image scanning failed
    #[error("Scan failed: {message}")]
    #[diagnostic(code(chartmirror::cli::scan))]
    Scan {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Configuration file could not be loaded
    #[error("Config error: {message}")]
    #[diagnostic(code(chartmirror::cli::config))]
    Config { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartmirror::cli::io))]
    Io { message: String },

    /// Internal error (serialization, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartmirror::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Scan { .. } => exit_codes::SCAN_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            other => CliError::input(other.to_string()),
        }
    }
}

impl From<ScanError> for CliError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Io(e) => e.into(),
            ScanError::Core(e) => e.into(),
            spawn @ ScanError::RendererSpawn { .. } => CliError::Scan {
                message: spawn.to_string(),
                help: Some(
                    "Install helm, set render.helm in the config, or pass --manifest".to_string(),
                ),
            },
            other => CliError::Scan {
                message: other.to_string(),
                help: Some("Use --strategy auto to fall back to the values tree".to_string()),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
