//! # Lazy Argument Lists
//!
//! [`Args`] records how a command line is put together without building it.
//! Entries are appended in order (literals, formatted single values and
//! whole groups of elements) and nothing is expanded until
//! [`Args::materialize`] is called. A group backed by a [`Depset`] stores
//! only a handle to the set, so building the list costs the same whether the
//! set holds ten elements or a hundred thousand.
//!
//! ```
//! use depset::args::{AllOptions, Args};
//! use depset::depset::{Depset, Order};
//!
//! let headers = Depset::leaf(vec!["a.h", "b.h"], Order::Preorder);
//!
//! let mut args = Args::new();
//! args.add("--foo");
//! args.add_all(headers, AllOptions::new().format_each("-I%s")).unwrap();
//!
//! assert_eq!(args.materialize().unwrap(), vec!["--foo", "-Ia.h", "-Ib.h"]);
//! ```
//!
//! Option mistakes (bad templates, conflicting options) are reported by the
//! `add_*` call that introduces them. The only failure left for
//! materialization is writing a param file.
//!
//! An `Args` is built by one owner through `&mut self`. Once built it can be
//! materialized any number of times, from any number of threads, with the
//! same result.

mod format;
mod options;
pub mod param_file;

pub use format::FormatTemplate;
pub use options::{AllOptions, MapFn};
pub use param_file::{ParamFile, ParamFileFormat, ParamFileMode};

use std::fmt;
use std::hash::Hash;

use log::{debug, info};

use crate::defaults::DEFAULT_PARAM_FILE_THRESHOLD;
use crate::depset::Depset;
use crate::error::Result;
use options::Expansion;

/// Elements for [`Args::add_all`]: a shared set or a plain list.
///
/// A set is flattened (deduplicated, in its order) at materialization; a
/// list is expanded as given.
pub enum Source<T> {
    Depset(Depset<T>),
    Values(Vec<T>),
}

impl<T> From<Depset<T>> for Source<T> {
    fn from(set: Depset<T>) -> Self {
        Source::Depset(set)
    }
}

impl<T> From<Vec<T>> for Source<T> {
    fn from(values: Vec<T>) -> Self {
        Source::Values(values)
    }
}

enum Entry<T> {
    Literal(String),
    LiteralList(Vec<String>),
    Formatted {
        element: T,
        template: FormatTemplate,
    },
    All {
        source: Source<T>,
        expansion: Expansion<T>,
    },
}

/// An ordered, lazily expanded argument list.
pub struct Args<T> {
    entries: Vec<Entry<T>>,
    param_file: Option<ParamFile>,
    param_file_format: ParamFileFormat,
    param_file_arg: FormatTemplate,
    param_file_threshold: usize,
}

impl<T> Default for Args<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            param_file: None,
            param_file_format: ParamFileFormat::default(),
            param_file_arg: FormatTemplate::param_file_reference(),
            param_file_threshold: DEFAULT_PARAM_FILE_THRESHOLD,
        }
    }
}

impl<T> Args<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fixed argument.
    pub fn add(&mut self, value: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Literal(value.into()));
        self
    }

    /// Appends several fixed arguments.
    pub fn add_all_literals<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(Entry::LiteralList(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Appends one argument: `element` substituted into `template`.
    pub fn add_formatted(&mut self, element: T, template: &str) -> Result<&mut Self> {
        let template = FormatTemplate::parse(template)?;
        self.entries.push(Entry::Formatted { element, template });
        Ok(self)
    }

    /// Appends a group of elements, expanded per `options`.
    ///
    /// A set passed here is not flattened until materialization.
    pub fn add_all(
        &mut self,
        source: impl Into<Source<T>>,
        options: AllOptions<T>,
    ) -> Result<&mut Self> {
        let expansion = options.compile()?;
        self.entries.push(Entry::All {
            source: source.into(),
            expansion,
        });
        Ok(self)
    }

    /// Routes the arguments through a file at `destination` when `mode`
    /// says so. Replaces any earlier request.
    pub fn use_param_file(
        &mut self,
        mode: ParamFileMode,
        destination: impl Into<std::path::PathBuf>,
    ) -> &mut Self {
        self.param_file = Some(ParamFile::new(mode, destination));
        self
    }

    pub fn set_param_file_format(&mut self, format: ParamFileFormat) -> &mut Self {
        self.param_file_format = format;
        self
    }

    /// Template for the argument that replaces a spilled list (default `@%s`).
    pub fn set_param_file_arg(&mut self, template: &str) -> Result<&mut Self> {
        self.param_file_arg = FormatTemplate::parse(template)?;
        Ok(self)
    }

    /// Command-line length above which `WhenTooLong` spills to a file.
    pub fn set_param_file_threshold(&mut self, threshold: usize) -> &mut Self {
        self.param_file_threshold = threshold;
        self
    }

    pub fn param_file(&self) -> Option<&ParamFile> {
        self.param_file.as_ref()
    }

    pub fn param_file_threshold(&self) -> usize {
        self.param_file_threshold
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Eq + Hash + fmt::Display> Args<T> {
    /// Expands every entry, ignoring any param file request.
    pub fn expand(&self) -> Vec<String> {
        let mut out = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::Literal(value) => out.push(value.clone()),
                Entry::LiteralList(values) => out.extend(values.iter().cloned()),
                Entry::Formatted { element, template } => {
                    out.push(template.apply(&element.to_string()))
                }
                Entry::All { source, expansion } => match source {
                    Source::Depset(set) => expansion.expand(set.elements(), &mut out),
                    Source::Values(values) => expansion.expand(values, &mut out),
                },
            }
        }
        out
    }

    /// Builds the final argument list.
    ///
    /// If a param file was requested and applies, the expanded arguments are
    /// written to it and the single reference argument is returned instead.
    pub fn materialize(&self) -> Result<Vec<String>> {
        let args = self.expand();
        debug!(
            "Materialized {} entries into {} arguments",
            self.entries.len(),
            args.len()
        );

        let Some(request) = &self.param_file else {
            return Ok(args);
        };

        let length = param_file::command_line_length(&args);
        if !request.mode.applies(length, self.param_file_threshold) {
            debug!(
                "Command line of {} chars kept inline (threshold {})",
                length, self.param_file_threshold
            );
            return Ok(args);
        }

        param_file::write(&request.destination, &args, self.param_file_format)?;
        info!(
            "Wrote {} arguments ({} chars) to {}",
            args.len(),
            length,
            request.destination.display()
        );

        let reference = self
            .param_file_arg
            .apply(&request.destination.to_string_lossy());
        Ok(vec![reference])
    }
}

impl<T> fmt::Debug for Args<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("entries", &self.entries.len())
            .field("param_file", &self.param_file)
            .field("param_file_format", &self.param_file_format)
            .field("param_file_threshold", &self.param_file_threshold)
            .finish()
    }
}
