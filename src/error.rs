//! # Error Handling
//!
//! This module defines the centralized error type for the `depset` library.
//! It uses `thiserror` to build a single `Error` enum covering every failure
//! mode of set construction, argument building and manifest loading.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Construction and add-time errors
//!   (`IncompatibleOrder`, `BadFormatTemplate`, `ConflictingArgsOptions`) are
//!   raised before any value is created, so a caller never observes a
//!   half-built set or argument list.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! No error is retried internally. Retrying a failed param file write, for
//! example, is left to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::depset::Order;

/// Main error type for depset operations
#[derive(Error, Debug)]
pub enum Error {
    /// A child set was built with an order the parent cannot absorb.
    #[error("Incompatible order: cannot add a {found} set to a {expected} set")]
    IncompatibleOrder { expected: Order, found: Order },

    /// A named set would transitively contain itself.
    #[error("Cyclic reference between sets: {cycle}")]
    CyclicReference { cycle: String },

    /// A format template does not have exactly one `%s` placeholder.
    #[error("Bad format template '{template}': {message}")]
    BadFormatTemplate { template: String, message: String },

    /// Two `add_all` options were combined that cannot be applied together.
    #[error("Conflicting argument options: {message}")]
    ConflictingArgsOptions { message: String },

    /// Writing a param file failed.
    #[error("Failed to write param file {}: {source}", path.display())]
    ParamFileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A set name was referenced but never declared.
    #[error("Unknown set: {name}")]
    UnknownDepset { name: String },

    /// A set name was declared more than once.
    #[error("Set declared twice: {name}")]
    DuplicateDepset { name: String },

    /// The manifest could not be interpreted.
    ///
    /// Includes an optional hint about how to fix it.
    #[error("Manifest parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
