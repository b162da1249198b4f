//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `depset`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `depset` library.

pub mod args;
pub mod completions;
pub mod flatten;
pub mod tree;

use std::path::Path;

use anyhow::Result;
use depset::graph::DepsetGraph;
use depset::manifest::Manifest;

/// Loads a manifest and declares its sets.
pub(crate) fn load_manifest(path: &Path) -> Result<(Manifest, DepsetGraph<String>)> {
    let manifest = Manifest::from_file(path).map_err(|e| {
        anyhow::anyhow!("Failed to load manifest from {}: {}", path.display(), e)
    })?;
    let graph = manifest
        .graph()
        .map_err(|e| anyhow::anyhow!("Invalid set declarations: {}", e))?;
    Ok((manifest, graph))
}
