//! # Flatten Command Implementation
//!
//! This module implements the `flatten` subcommand, which prints the
//! flattened contents of one or more sets declared in a manifest.
//!
//! ## Functionality
//!
//! - **Single set**: prints one element per line.
//! - **Several sets**: prints each set under a heading. Sets are resolved
//!   together, so shared children are built once, and flattened in parallel.
//! - **JSON**: `--json` prints an object mapping set names to element lists.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use rayon::prelude::*;
use std::path::PathBuf;

use depset::defaults::DEFAULT_MANIFEST;
use depset::output::{set_name, OutputConfig};

use super::load_manifest;

/// Flatten one or more sets declared in a manifest
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Path to the manifest file.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST, env = "DEPSET_MANIFEST")]
    pub manifest: PathBuf,

    /// Print a JSON object of set name to elements.
    #[arg(long)]
    pub json: bool,

    /// Sets to flatten. Flattens every declared set when omitted.
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

/// Execute the `flatten` command.
pub fn execute(args: FlattenArgs, output: &OutputConfig) -> Result<()> {
    let results = flatten_sets(&args)?;

    if args.json {
        println!("{}", to_json(results)?);
        return Ok(());
    }

    let single = results.len() == 1;
    for (name, elements) in results {
        if single {
            for element in elements {
                println!("{}", element);
            }
        } else {
            println!("{}:", set_name(output, &name));
            for element in elements {
                println!("  {}", element);
            }
        }
    }
    Ok(())
}

/// JSON object of set name to elements. Keys keep request order.
fn to_json(results: Vec<(String, Vec<String>)>) -> Result<String> {
    let object: serde_json::Map<String, serde_json::Value> = results
        .into_iter()
        .map(|(name, elements)| (name, serde_json::Value::from(elements)))
        .collect();
    Ok(serde_json::to_string_pretty(&object)?)
}

/// Resolves and flattens the requested sets, in request order.
pub(crate) fn flatten_sets(args: &FlattenArgs) -> Result<Vec<(String, Vec<String>)>> {
    let (_, graph) = load_manifest(&args.manifest)?;

    let names: Vec<String> = if args.names.is_empty() {
        graph.names().map(str::to_string).collect()
    } else {
        args.names.clone()
    };
    if let Some(unknown) = names.iter().find(|name| !graph.contains(name)) {
        anyhow::bail!("No set named '{}' in {}", unknown, args.manifest.display());
    }

    let sets = graph
        .resolve_all()
        .map_err(|e| anyhow::anyhow!("Failed to resolve sets: {}", e))?;

    let results = names
        .par_iter()
        .filter_map(|name| sets.get(name).map(|set| (name.clone(), set.flatten())))
        .collect();
    Ok(results)
}
