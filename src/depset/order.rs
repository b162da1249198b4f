//! Traversal orders a set can be built with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a set's elements are laid out when it is flattened.
///
/// The order is fixed when a set is constructed. A set may only absorb
/// children built with the same order, except for `Unordered` sets which
/// accept children of any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// No ordering promise beyond determinism. Also accepted as `default`.
    #[default]
    #[serde(alias = "default")]
    Unordered,
    /// A node's own elements come before its children's.
    Preorder,
    /// A node's own elements come after its children's.
    Postorder,
    /// Every node's elements come after all of its descendants' elements.
    Topological,
}

impl Order {
    /// All orders, in declaration order.
    pub const ALL: [Order; 4] = [
        Order::Unordered,
        Order::Preorder,
        Order::Postorder,
        Order::Topological,
    ];

    /// The lowercase name used in manifests and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Unordered => "unordered",
            Order::Preorder => "preorder",
            Order::Postorder => "postorder",
            Order::Topological => "topological",
        }
    }

    /// Whether a set of this order may hold a child built with `child`.
    pub fn accepts(self, child: Order) -> bool {
        self == Order::Unordered || self == child
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unordered" | "default" => Ok(Order::Unordered),
            "preorder" => Ok(Order::Preorder),
            "postorder" => Ok(Order::Postorder),
            "topological" => Ok(Order::Topological),
            other => Err(Error::ManifestParse {
                message: format!("unknown order '{}'", other),
                hint: Some(
                    "expected one of: unordered, default, preorder, postorder, topological"
                        .to_string(),
                ),
            }),
        }
    }
}
