//! Default values for depset.
//!
//! This module provides centralized default values used by the library and
//! the CLI, ensuring consistency and avoiding duplication.

/// Manifest file read when no `--manifest` is given.
///
/// Can also be set with the `DEPSET_MANIFEST` environment variable.
pub const DEFAULT_MANIFEST: &str = "depset.yaml";

/// Longest command line the platform accepts, in characters.
///
/// Windows limits `CreateProcess` command lines to 32767 characters. On
/// Unix the per-argument kernel limit (`MAX_ARG_STRLEN`, 128 KiB) is the
/// tightest bound a single joined argument can hit.
#[cfg(windows)]
pub const MAX_COMMAND_LINE_LENGTH: usize = 32_767;
#[cfg(not(windows))]
pub const MAX_COMMAND_LINE_LENGTH: usize = 131_072;

/// Room left for the executable path, environment and wrapper arguments.
pub const PARAM_FILE_SAFETY_MARGIN: usize = 2_048;

/// Command-line length above which `when_too_long` spills to a param file.
///
/// Can be overridden per manifest (`settings.param_file_threshold`), by the
/// `--param-file-threshold` CLI flag, or by `DEPSET_PARAM_FILE_THRESHOLD`.
pub const DEFAULT_PARAM_FILE_THRESHOLD: usize = MAX_COMMAND_LINE_LENGTH - PARAM_FILE_SAFETY_MARGIN;

/// Deepest level `tree` draws, whatever `--depth` asks for.
///
/// Rendering recurses once per level, so chains longer than this are cut
/// off with a warning instead of exhausting the stack.
pub const MAX_TREE_DEPTH: usize = 200;
