//! # Manifest Schema and Parsing
//!
//! This module defines the YAML manifest consumed by the `depset` CLI and the
//! logic that turns it into library values. A manifest declares named sets
//! and, optionally, a command line built from them.
//!
//! ## Example
//!
//! ```yaml
//! settings:
//!   param_file_threshold: 4096
//! depsets:
//!   base:
//!     direct: [base.h]
//!   headers:
//!     order: postorder
//!     direct: [a.h, b.h]
//!     transitive: [base]
//! command:
//!   - literal: --foo
//!   - literals: [-c, -O2]
//!   - formatted: { value: out.o, template: "--out=%s" }
//!   - all:
//!       depset: headers
//!       format_each: "-I%s"
//! param_file:
//!   mode: when_too_long
//!   path: out.params
//! ```
//!
//! ## Key Components
//!
//! - **`Manifest`**: The whole document. [`Manifest::graph`] builds a
//!   [`DepsetGraph`] from the `depsets` section and [`Manifest::args`] builds
//!   an [`Args`] from the `command` and `param_file` sections.
//!
//! - **`CommandEntry`**: One entry of the command line. Each entry is a
//!   mapping with exactly one of `literal`, `literals`, `formatted` or `all`.
//!
//! Sets are keyed by name, so they may reference each other in any order.
//! Cycles, unknown names and order mismatches are reported when the sets are
//! resolved, not while parsing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::args::{AllOptions, Args, ParamFileFormat, ParamFileMode};
use crate::depset::{Depset, Order};
use crate::error::{Error, Result};
use crate::graph::DepsetGraph;

/// Global knobs for the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Command-line length above which `when_too_long` spills to a file.
    #[serde(default)]
    pub param_file_threshold: Option<usize>,
}

/// A named set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetSpec {
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub direct: Vec<String>,
    /// Names of child sets.
    #[serde(default)]
    pub transitive: Vec<String>,
}

/// Built-in per-element transforms for `all` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapEach {
    #[default]
    Identity,
    /// Last path component.
    Basename,
    /// Everything before the last path component.
    Dirname,
    /// Last path component without its extension.
    Stem,
}

impl MapEach {
    pub fn apply(self, value: &str) -> String {
        let path = Path::new(value);
        match self {
            MapEach::Identity => value.to_string(),
            MapEach::Basename => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            MapEach::Dirname => path
                .parent()
                .map(|parent| parent.to_string_lossy().into_owned())
                .unwrap_or_default(),
            MapEach::Stem => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// A single element substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormattedSpec {
    pub value: String,
    pub template: String,
}

/// A group of elements, from a named set or an inline list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllSpec {
    /// Name of a set declared under `depsets`.
    #[serde(default)]
    pub depset: Option<String>,
    /// Inline values, expanded as given.
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub map_each: MapEach,
    #[serde(default)]
    pub format_each: Option<String>,
    #[serde(default)]
    pub format_joined: Option<String>,
    #[serde(default)]
    pub join_with: Option<String>,
    #[serde(default)]
    pub before_each: Option<String>,
    #[serde(default)]
    pub terminate_with: Option<String>,
    #[serde(default)]
    pub uniquify: bool,
    #[serde(default = "default_omit_if_empty")]
    pub omit_if_empty: bool,
}

fn default_omit_if_empty() -> bool {
    true
}

/// All possible command-line entries in the manifest
///
/// In YAML an entry is a mapping with a single key naming its kind. The
/// key selects the variant before the value is read, so a mistake inside
/// the value (an unknown `all` option, say) is reported as itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEntry {
    /// One fixed argument.
    Literal { literal: String },
    /// Several fixed arguments.
    Literals { literals: Vec<String> },
    /// One value through a `%s` template.
    Formatted { formatted: FormattedSpec },
    /// A group of elements.
    All { all: AllSpec },
}

const ENTRY_KINDS: &[&str] = &["literal", "literals", "formatted", "all"];

impl<'de> Deserialize<'de> for CommandEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CommandEntryVisitor)
    }
}

struct CommandEntryVisitor;

impl<'de> Visitor<'de> for CommandEntryVisitor {
    type Value = CommandEntry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a command entry with exactly one of: literal, literals, formatted, all")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<CommandEntry, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Some(kind) = map.next_key::<String>()? else {
            return Err(de::Error::invalid_length(0, &self));
        };

        let entry = match kind.as_str() {
            "literal" => CommandEntry::Literal {
                literal: map.next_value()?,
            },
            "literals" => CommandEntry::Literals {
                literals: map.next_value()?,
            },
            "formatted" => CommandEntry::Formatted {
                formatted: map.next_value()?,
            },
            "all" => CommandEntry::All {
                all: map.next_value()?,
            },
            other => return Err(de::Error::unknown_variant(other, ENTRY_KINDS)),
        };

        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format_args!(
                "command entry `{}` has an extra key `{}`, a command entry takes exactly one key",
                kind, extra
            )));
        }
        Ok(entry)
    }
}

impl Serialize for CommandEntry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            CommandEntry::Literal { literal } => map.serialize_entry("literal", literal)?,
            CommandEntry::Literals { literals } => map.serialize_entry("literals", literals)?,
            CommandEntry::Formatted { formatted } => {
                map.serialize_entry("formatted", formatted)?
            }
            CommandEntry::All { all } => map.serialize_entry("all", all)?,
        }
        map.end()
    }
}

/// Where and when to spill the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamFileSpec {
    #[serde(default)]
    pub mode: ParamFileMode,
    /// Relative paths are taken from the manifest's directory.
    pub path: PathBuf,
    #[serde(default)]
    pub format: ParamFileFormat,
    /// Template for the replacing argument, `@%s` when absent.
    #[serde(default)]
    pub arg: Option<String>,
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub depsets: BTreeMap<String, SetSpec>,
    #[serde(default)]
    pub command: Vec<CommandEntry>,
    #[serde(default)]
    pub param_file: Option<ParamFileSpec>,
    /// Directory the manifest was loaded from.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Manifest {
    /// Parses a YAML manifest. An empty document is an empty manifest.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(yaml_content).map_err(|e| {
            let message = e.to_string();
            let hint = hint_for(&message);
            Error::ManifestParse { message, hint }
        })
    }

    /// Loads a manifest from disk.
    ///
    /// Relative param file paths are resolved against the manifest's
    /// directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut manifest = Self::parse(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Declares every set of the `depsets` section.
    pub fn graph(&self) -> Result<DepsetGraph<String>> {
        let mut graph = DepsetGraph::new();
        for (name, spec) in &self.depsets {
            let mut seen = HashSet::new();
            for element in &spec.direct {
                if !seen.insert(element) {
                    warn!("Set '{}' lists '{}' more than once", name, element);
                }
            }
            graph.declare(
                name.clone(),
                spec.direct.clone(),
                spec.transitive.clone(),
                spec.order,
            )?;
        }
        Ok(graph)
    }

    /// Builds the command line of the `command` and `param_file` sections.
    ///
    /// Sets are resolved once and shared between entries that use them.
    pub fn args(&self, graph: &DepsetGraph<String>) -> Result<Args<String>> {
        let mut sets: HashMap<&str, Depset<String>> = HashMap::new();
        let mut args = Args::new();

        for entry in &self.command {
            match entry {
                CommandEntry::Literal { literal } => {
                    args.add(literal.clone());
                }
                CommandEntry::Literals { literals } => {
                    args.add_all_literals(literals.iter().cloned());
                }
                CommandEntry::Formatted { formatted } => {
                    args.add_formatted(formatted.value.clone(), &formatted.template)?;
                }
                CommandEntry::All { all } => {
                    let options = all_options(all);
                    match (&all.depset, &all.values) {
                        (Some(name), None) => {
                            let set = match sets.get(name.as_str()) {
                                Some(set) => set.clone(),
                                None => {
                                    let set = graph.resolve(name)?;
                                    sets.insert(name.as_str(), set.clone());
                                    set
                                }
                            };
                            args.add_all(set, options)?;
                        }
                        (None, Some(values)) => {
                            args.add_all(values.clone(), options)?;
                        }
                        _ => {
                            return Err(Error::ManifestParse {
                                message: "an `all` entry needs exactly one of `depset` or `values`"
                                    .to_string(),
                                hint: Some(
                                    "use `depset: <name>` for a declared set or `values: [..]` for an inline list"
                                        .to_string(),
                                ),
                            })
                        }
                    }
                }
            }
        }

        if let Some(threshold) = self.settings.param_file_threshold {
            args.set_param_file_threshold(threshold);
        }
        if let Some(spec) = &self.param_file {
            args.use_param_file(spec.mode, self.resolve_path(&spec.path))
                .set_param_file_format(spec.format);
            if let Some(template) = &spec.arg {
                args.set_param_file_arg(template)?;
            }
        }

        Ok(args)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn all_options(spec: &AllSpec) -> AllOptions<String> {
    let mut options = AllOptions::new()
        .uniquify(spec.uniquify)
        .omit_if_empty(spec.omit_if_empty);

    if spec.map_each != MapEach::Identity {
        let map_each = spec.map_each;
        options = options.map_each(move |value: &String| map_each.apply(value));
    }
    if let Some(template) = &spec.format_each {
        options = options.format_each(template.clone());
    }
    if let Some(template) = &spec.format_joined {
        options = options.format_joined(template.clone());
    }
    if let Some(separator) = &spec.join_with {
        options = options.join_with(separator.clone());
    }
    if let Some(literal) = &spec.before_each {
        options = options.before_each(literal.clone());
    }
    if let Some(literal) = &spec.terminate_with {
        options = options.terminate_with(literal.clone());
    }
    options
}

fn hint_for(message: &str) -> Option<String> {
    let entry_kind = message.contains("unknown variant") && message.contains("`literals`");
    if entry_kind || message.contains("command entry") {
        Some(
            "each command entry needs exactly one of: literal, literals, formatted, all"
                .to_string(),
        )
    } else if message.contains("unknown variant") && message.contains("unordered") {
        Some("order must be one of: unordered, default, preorder, postorder, topological".to_string())
    } else if message.contains("unknown field") {
        Some("check the key names against the manifest reference in the README".to_string())
    } else {
        None
    }
}
