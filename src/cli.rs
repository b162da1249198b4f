//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use depset::output::OutputConfig;

use crate::commands;

/// depset - Flatten shared dependency sets and build command lines from them
#[derive(Parser, Debug)]
#[command(name = "depset")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten one or more sets declared in a manifest
    Flatten(commands::flatten::FlattenArgs),

    /// Materialize the manifest's command line
    Args(commands::args::ArgsArgs),

    /// Display a set and everything it includes as a tree
    Tree(commands::tree::TreeArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(&self.log_level))
            .format_timestamp(None)
            .try_init();

        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        match self.command {
            Commands::Flatten(args) => commands::flatten::execute(args, &output),
            Commands::Args(args) => commands::args::execute(args),
            Commands::Tree(args) => commands::tree::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
