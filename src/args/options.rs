//! Options for [`Args::add_all`](super::Args::add_all).

use std::collections::HashSet;
use std::fmt;

use super::format::FormatTemplate;
use crate::error::{Error, Result};

/// A pure per-element transform.
pub type MapFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// How a group of elements expands into arguments.
///
/// Each element is mapped (`map_each`, default `to_string`), then formatted
/// (`format_each`). The resulting strings either become one argument each,
/// optionally preceded by `before_each`, or are joined into a single
/// argument (`join_with`, `format_joined`). `terminate_with` closes the
/// group.
///
/// ```
/// use depset::args::{AllOptions, Args};
///
/// let mut args = Args::new();
/// args.add_all(vec!["x", "y", "z"], AllOptions::new().join_with(","))
///     .unwrap();
/// assert_eq!(args.expand(), vec!["x,y,z"]);
/// ```
pub struct AllOptions<T> {
    map_each: Option<MapFn<T>>,
    format_each: Option<String>,
    format_joined: Option<String>,
    join_with: Option<String>,
    before_each: Option<String>,
    terminate_with: Option<String>,
    uniquify: bool,
    omit_if_empty: bool,
}

impl<T> Default for AllOptions<T> {
    fn default() -> Self {
        Self {
            map_each: None,
            format_each: None,
            format_joined: None,
            join_with: None,
            before_each: None,
            terminate_with: None,
            uniquify: false,
            omit_if_empty: true,
        }
    }
}

impl<T> AllOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders each element with `f` instead of `to_string`.
    pub fn map_each(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.map_each = Some(Box::new(f));
        self
    }

    /// Template applied to every rendered element.
    pub fn format_each(mut self, template: impl Into<String>) -> Self {
        self.format_each = Some(template.into());
        self
    }

    /// Template wrapping the whole group once joined. Without `join_with`
    /// the elements are joined with a single space.
    pub fn format_joined(mut self, template: impl Into<String>) -> Self {
        self.format_joined = Some(template.into());
        self
    }

    /// Joins the whole group into one argument.
    pub fn join_with(mut self, separator: impl Into<String>) -> Self {
        self.join_with = Some(separator.into());
        self
    }

    /// Emits `literal` as its own argument before every element.
    pub fn before_each(mut self, literal: impl Into<String>) -> Self {
        self.before_each = Some(literal.into());
        self
    }

    /// Emits `literal` once after the group.
    pub fn terminate_with(mut self, literal: impl Into<String>) -> Self {
        self.terminate_with = Some(literal.into());
        self
    }

    /// Drops strings already produced earlier in the group.
    pub fn uniquify(mut self, uniquify: bool) -> Self {
        self.uniquify = uniquify;
        self
    }

    /// When false, an empty group still emits its joined argument and
    /// terminator.
    pub fn omit_if_empty(mut self, omit: bool) -> Self {
        self.omit_if_empty = omit;
        self
    }

    /// Checks option combinations and parses templates.
    pub(crate) fn compile(self) -> Result<Expansion<T>> {
        if self.before_each.is_some() {
            let joined_by = if self.join_with.is_some() {
                Some("join_with")
            } else if self.format_joined.is_some() {
                Some("format_joined")
            } else {
                None
            };
            if let Some(option) = joined_by {
                return Err(Error::ConflictingArgsOptions {
                    message: format!(
                        "before_each cannot be combined with {}: the group becomes a single argument",
                        option
                    ),
                });
            }
        }

        Ok(Expansion {
            map_each: self.map_each,
            format_each: self
                .format_each
                .as_deref()
                .map(FormatTemplate::parse)
                .transpose()?,
            format_joined: self
                .format_joined
                .as_deref()
                .map(FormatTemplate::parse)
                .transpose()?,
            join_with: self.join_with,
            before_each: self.before_each,
            terminate_with: self.terminate_with,
            uniquify: self.uniquify,
            omit_if_empty: self.omit_if_empty,
        })
    }
}

impl<T> fmt::Debug for AllOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllOptions")
            .field("map_each", &self.map_each.is_some())
            .field("format_each", &self.format_each)
            .field("format_joined", &self.format_joined)
            .field("join_with", &self.join_with)
            .field("before_each", &self.before_each)
            .field("terminate_with", &self.terminate_with)
            .field("uniquify", &self.uniquify)
            .field("omit_if_empty", &self.omit_if_empty)
            .finish()
    }
}

/// Validated form of [`AllOptions`] stored in an entry.
pub(crate) struct Expansion<T> {
    map_each: Option<MapFn<T>>,
    format_each: Option<FormatTemplate>,
    format_joined: Option<FormatTemplate>,
    join_with: Option<String>,
    before_each: Option<String>,
    terminate_with: Option<String>,
    uniquify: bool,
    omit_if_empty: bool,
}

impl<T: fmt::Display> Expansion<T> {
    fn render(&self, element: &T) -> String {
        let value = match &self.map_each {
            Some(f) => f(element),
            None => element.to_string(),
        };
        match &self.format_each {
            Some(template) => template.apply(&value),
            None => value,
        }
    }

    /// Appends the arguments for `elements` to `out`.
    pub(crate) fn expand<'a, I>(&self, elements: I, out: &mut Vec<String>)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut values: Vec<String> = elements.into_iter().map(|e| self.render(e)).collect();
        if self.uniquify {
            let mut seen = HashSet::new();
            values.retain(|value| seen.insert(value.clone()));
        }
        if values.is_empty() && self.omit_if_empty {
            return;
        }

        let separator = match (&self.join_with, &self.format_joined) {
            (Some(separator), _) => Some(separator.as_str()),
            (None, Some(_)) => Some(" "),
            (None, None) => None,
        };

        match separator {
            Some(separator) => {
                let joined = values.join(separator);
                out.push(match &self.format_joined {
                    Some(template) => template.apply(&joined),
                    None => joined,
                });
            }
            None => {
                for value in values {
                    if let Some(before) = &self.before_each {
                        out.push(before.clone());
                    }
                    out.push(value);
                }
            }
        }

        if let Some(terminator) = &self.terminate_with {
            out.push(terminator.clone());
        }
    }
}
