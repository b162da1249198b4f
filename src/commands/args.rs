//! # Args Command Implementation
//!
//! This module implements the `args` subcommand, which materializes the
//! `command` section of a manifest into a final argument list.
//!
//! ## Functionality
//!
//! - **Materialization**: expands every command entry, writing a param file
//!   when the manifest requests one and it applies.
//! - **Dry Run**: `--dry-run` prints the expanded arguments without ever
//!   writing a param file.
//! - **Threshold Override**: `--param-file-threshold` replaces the manifest's
//!   threshold for `when_too_long` param files.
//!
//! Arguments are printed one per line.

use anyhow::Result;
use clap::Args;
use log::info;
use std::path::PathBuf;

use depset::defaults::DEFAULT_MANIFEST;

use super::load_manifest;

/// Materialize the manifest's command line
#[derive(Args, Debug)]
pub struct ArgsArgs {
    /// Path to the manifest file.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST, env = "DEPSET_MANIFEST")]
    pub manifest: PathBuf,

    /// Print the expanded arguments without writing a param file.
    #[arg(long)]
    pub dry_run: bool,

    /// Command line length above which a `when_too_long` param file is used.
    #[arg(long, value_name = "CHARS", env = "DEPSET_PARAM_FILE_THRESHOLD")]
    pub param_file_threshold: Option<usize>,
}

/// Execute the `args` command.
pub fn execute(args: ArgsArgs) -> Result<()> {
    for arg in build_args(&args)? {
        println!("{}", arg);
    }
    Ok(())
}

/// Builds the argument list the command prints.
pub(crate) fn build_args(args: &ArgsArgs) -> Result<Vec<String>> {
    let (manifest, graph) = load_manifest(&args.manifest)?;

    let mut command = manifest
        .args(&graph)
        .map_err(|e| anyhow::anyhow!("Failed to build command line: {}", e))?;
    if let Some(threshold) = args.param_file_threshold {
        command.set_param_file_threshold(threshold);
    }

    if args.dry_run {
        info!("Dry run: param file settings are ignored");
        return Ok(command.expand());
    }

    command
        .materialize()
        .map_err(|e| anyhow::anyhow!("Failed to materialize command line: {}", e))
}
