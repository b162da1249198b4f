//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays a set and
//! every set it includes in a hierarchical format.
//!
//! ## Functionality
//!
//! - **Set Tree Visualization**: each node shows the set name, its order and
//!   its direct elements.
//! - **Shared Sets**: a set included from several places is expanded once;
//!   later occurrences are marked `(shown above)`.
//! - **Depth Control**: supports a `--depth` flag to limit tree depth. Trees
//!   are never drawn deeper than `MAX_TREE_DEPTH` levels.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use log::warn;
use ptree::{write_tree, TreeItem};
use std::collections::HashSet;
use std::path::PathBuf;

use depset::defaults::{DEFAULT_MANIFEST, MAX_TREE_DEPTH};
use depset::graph::DepsetGraph;
use depset::output::{set_name, OutputConfig};

use super::load_manifest;

/// Display a set and everything it includes as a tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path to the manifest file.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST, env = "DEPSET_MANIFEST")]
    pub manifest: PathBuf,

    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree.
    /// Use 0 to show only the root set, 1 to show its direct children, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,

    /// Set to display. Displays every set no other set includes when omitted.
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, output: &OutputConfig) -> Result<()> {
    print!("{}", render(&args, output)?);
    Ok(())
}

/// Renders the requested trees to a string.
pub(crate) fn render(args: &TreeArgs, output: &OutputConfig) -> Result<String> {
    let (_, graph) = load_manifest(&args.manifest)?;

    // Cycles and unknown references are reported before anything is drawn.
    graph
        .resolve_all()
        .map_err(|e| anyhow::anyhow!("Failed to resolve sets: {}", e))?;

    let roots: Vec<String> = match &args.name {
        Some(name) if graph.contains(name) => vec![name.clone()],
        Some(name) => {
            anyhow::bail!("No set named '{}' in {}", name, args.manifest.display())
        }
        None => root_names(&graph),
    };

    let requested = args.depth.unwrap_or(usize::MAX);
    let mut builder = TreeBuilder {
        graph: &graph,
        output,
        expanded: HashSet::new(),
        max_depth: requested.min(MAX_TREE_DEPTH),
        truncated: false,
    };

    let mut buffer = Vec::new();
    for root in &roots {
        builder.expanded.clear();
        let node = builder.build(root, 0);
        write_tree(&node, &mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    }
    if builder.truncated && requested > MAX_TREE_DEPTH {
        warn!(
            "Tree is deeper than {} levels; deeper sets are not shown",
            MAX_TREE_DEPTH
        );
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Declared sets that no other set includes, in declaration order.
fn root_names(graph: &DepsetGraph<String>) -> Vec<String> {
    let included: HashSet<&str> = graph
        .names()
        .filter_map(|name| graph.get(name))
        .flat_map(|declaration| declaration.transitive().iter().map(String::as_str))
        .collect();
    graph
        .names()
        .filter(|name| !included.contains(name))
        .map(str::to_string)
        .collect()
}

/// Builds tree nodes from set declarations for one rendering pass.
struct TreeBuilder<'a> {
    graph: &'a DepsetGraph<String>,
    output: &'a OutputConfig,
    /// Sets whose children have been drawn under the current root.
    expanded: HashSet<String>,
    max_depth: usize,
    /// Whether some set with children sat at `max_depth`.
    truncated: bool,
}

impl TreeBuilder<'_> {
    fn build(&mut self, name: &str, current_depth: usize) -> TreeNode {
        let graph = self.graph;
        let shown = set_name(self.output, name);
        let Some(declaration) = graph.get(name) else {
            return TreeNode::leaf(shown);
        };

        if self.expanded.contains(name) {
            return TreeNode::leaf(format!("{} (shown above)", shown));
        }

        let mut label = format!("{} [{}]", shown, declaration.order());
        if !declaration.direct().is_empty() {
            label.push_str(": ");
            label.push_str(&declaration.direct().join(", "));
        }

        // A set cut off by the depth limit has not been shown in full, so a
        // later occurrence above the limit still expands it.
        if current_depth >= self.max_depth && !declaration.transitive().is_empty() {
            self.truncated = true;
            return TreeNode::leaf(label);
        }
        self.expanded.insert(name.to_string());

        let children = declaration
            .transitive()
            .iter()
            .map(|child| self.build(child, current_depth + 1))
            .collect();
        TreeNode { label, children }
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: vec![],
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
depsets:
  app:
    order: postorder
    direct: [app.o]
    transitive: [net, log]
  net:
    order: postorder
    direct: [net.o]
    transitive: [log]
  log:
    order: postorder
    direct: [log.o]
"#;

    fn args_for(temp: &TempDir, manifest: &str, name: Option<&str>, depth: Option<usize>) -> TreeArgs {
        let path = temp.path().join("depset.yaml");
        std::fs::write(&path, manifest).unwrap();
        TreeArgs {
            manifest: path,
            depth,
            name: name.map(str::to_string),
        }
    }

    fn plain() -> OutputConfig {
        OutputConfig::from_env_and_flag("never")
    }

    #[test]
    fn test_tree_marks_shared_sets() {
        let temp = TempDir::new().unwrap();
        let rendered = render(&args_for(&temp, MANIFEST, Some("app"), None), &plain()).unwrap();

        assert!(rendered.contains("app [postorder]: app.o"));
        assert!(rendered.contains("net [postorder]: net.o"));
        assert!(rendered.contains("log [postorder]: log.o"));
        assert!(rendered.contains("log (shown above)"));
        assert_eq!(rendered.matches("log.o").count(), 1);
    }

    #[test]
    fn test_tree_depth_limit() {
        let temp = TempDir::new().unwrap();
        let rendered = render(&args_for(&temp, MANIFEST, Some("app"), Some(0)), &plain()).unwrap();
        assert!(rendered.contains("app [postorder]"));
        assert!(!rendered.contains("net"));
    }

    #[test]
    fn test_tree_set_cut_by_depth_expands_later() {
        let temp = TempDir::new().unwrap();
        let manifest = r#"
depsets:
  app:
    transitive: [net, base]
  net:
    transitive: [base]
  base:
    direct: [base.o]
    transitive: [core]
  core:
    direct: [core.o]
"#;
        let rendered = render(&args_for(&temp, manifest, Some("app"), Some(2)), &plain()).unwrap();

        // `base` first appears at the limit under `net`, then again directly
        // under `app`, where its child fits.
        assert!(rendered.contains("core"), "{rendered}");
        assert!(!rendered.contains("base (shown above)"), "{rendered}");
        assert_eq!(rendered.matches("base.o").count(), 2);
    }

    #[test]
    fn test_tree_leaf_at_depth_limit_counts_as_shown() {
        let temp = TempDir::new().unwrap();
        let rendered = render(&args_for(&temp, MANIFEST, Some("app"), Some(2)), &plain()).unwrap();
        assert_eq!(rendered.matches("log.o").count(), 1);
        assert!(rendered.contains("log (shown above)"));
    }

    #[test]
    fn test_tree_deep_chain_is_capped() {
        let temp = TempDir::new().unwrap();
        let mut manifest = String::from("depsets:\n");
        for i in 0..5_000 {
            manifest.push_str(&format!("  s{i}:\n    direct: [e{i}]\n"));
            if i + 1 < 5_000 {
                manifest.push_str(&format!("    transitive: [s{}]\n", i + 1));
            }
        }

        let rendered = render(&args_for(&temp, &manifest, Some("s0"), None), &plain()).unwrap();
        assert_eq!(rendered.lines().count(), MAX_TREE_DEPTH + 1);
        assert!(rendered.contains(&format!("s{} [", MAX_TREE_DEPTH)));
        assert!(!rendered.contains(&format!("s{} [", MAX_TREE_DEPTH + 1)));
    }

    #[test]
    fn test_tree_defaults_to_roots() {
        let temp = TempDir::new().unwrap();
        let rendered = render(&args_for(&temp, MANIFEST, None, Some(0)), &plain()).unwrap();
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.starts_with("app"));
    }

    #[test]
    fn test_tree_reports_cycles() {
        let temp = TempDir::new().unwrap();
        let manifest = r#"
depsets:
  a:
    transitive: [b]
  b:
    transitive: [a]
"#;
        let err = render(&args_for(&temp, manifest, Some("a"), None), &plain()).unwrap_err();
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn test_tree_unknown_set() {
        let temp = TempDir::new().unwrap();
        let err = render(&args_for(&temp, MANIFEST, Some("nope"), None), &plain()).unwrap_err();
        assert!(err.to_string().contains("No set named 'nope'"));
    }

    #[test]
    fn test_execute_missing_manifest() {
        let args = TreeArgs {
            manifest: PathBuf::from("/nonexistent/depset.yaml"),
            depth: None,
            name: None,
        };
        let result = execute(args, &plain());
        assert!(result.unwrap_err().to_string().contains("Failed to load manifest"));
    }
}
