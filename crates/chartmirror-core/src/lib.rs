//! Chartmirror Core - Core types shared by the image scanner and the CLI
//!
//! This crate provides the foundational types used throughout chartmirror:
//! - `Values`: A chart's configuration tree with deep merge support
//! - `ImageIdentity`: Registry, repository, tag and digest of one container image
//! - `ImageReference`: A parsed, normalized image reference string

pub mod error;
pub mod image;
pub mod values;

pub use error::{CoreError, Result};
pub use image::{ImageIdentity, ImageReference};
pub use values::{Values, parse_set_values};
