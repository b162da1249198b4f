//! Param files: spilling a long argument list into a file.
//!
//! When a command line would be too long for the platform, the arguments
//! are written to a file and replaced by a single reference argument
//! (`@path` by default) that the invoked tool expands itself.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// When a param file is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamFileMode {
    Always,
    /// Only when the expanded command line exceeds the threshold.
    #[default]
    WhenTooLong,
    Never,
}

impl ParamFileMode {
    /// Whether a command line of `length` characters goes to a file.
    pub fn applies(self, length: usize, threshold: usize) -> bool {
        match self {
            ParamFileMode::Always => true,
            ParamFileMode::WhenTooLong => length > threshold,
            ParamFileMode::Never => false,
        }
    }
}

/// How arguments are laid out inside a param file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamFileFormat {
    /// One raw argument per line.
    #[default]
    Multiline,
    /// One shell-quoted argument per line.
    Shell,
}

/// A request to route the arguments through a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamFile {
    pub mode: ParamFileMode,
    pub destination: PathBuf,
}

impl ParamFile {
    pub fn new(mode: ParamFileMode, destination: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            destination: destination.into(),
        }
    }
}

/// Length of `args` as a single space-separated command line.
pub fn command_line_length(args: &[String]) -> usize {
    let chars: usize = args.iter().map(|arg| arg.chars().count()).sum();
    chars + args.len().saturating_sub(1)
}

/// File contents for `args` in `format`, one argument per line.
pub fn render(args: &[String], format: ParamFileFormat) -> String {
    let mut contents = String::new();
    for arg in args {
        match format {
            ParamFileFormat::Multiline => contents.push_str(arg),
            ParamFileFormat::Shell => contents.push_str(&shell_words::quote(arg)),
        }
        contents.push('\n');
    }
    contents
}

/// The first argument the multiline format cannot hold: one with a line
/// break would read back as two arguments.
fn unrepresentable(args: &[String], format: ParamFileFormat) -> Option<&str> {
    match format {
        ParamFileFormat::Multiline => args
            .iter()
            .find(|arg| arg.contains(['\n', '\r']))
            .map(String::as_str),
        ParamFileFormat::Shell => None,
    }
}

/// Writes `args` to `path`, creating parent directories as needed.
///
/// The file is flushed before this returns. Failures are reported as
/// `ParamFileWriteFailed` and are not retried. In the multiline format an
/// argument containing a line break is refused before anything is written.
pub fn write(path: &Path, args: &[String], format: ParamFileFormat) -> Result<()> {
    let failed = |source: io::Error| Error::ParamFileWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(arg) = unrepresentable(args, format) {
        return Err(failed(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "argument {:?} contains a line break; use the shell format",
                arg
            ),
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(failed)?;
    }

    let file = fs::File::create(path).map_err(failed)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render(args, format).as_bytes())
        .map_err(failed)?;
    writer.flush().map_err(failed)?;
    Ok(())
}
