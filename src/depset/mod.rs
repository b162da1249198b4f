//! # Ordered Sharing Sets
//!
//! A [`Depset`] is an immutable set of elements made of a node's own
//! (`direct`) elements plus the union of any number of child sets
//! (`transitive`). Children are shared, never copied: building a set on top
//! of another stores a reference-counted handle to it. A set with thousands
//! of parents exists exactly once in memory.
//!
//! Nothing is expanded until [`Depset::flatten`] is called. Flattening walks
//! the DAG once, visiting every node at most once per call and emitting each
//! distinct element exactly once, in the order the set was built with (see
//! [`Order`]).
//!
//! ```
//! use depset::depset::{Depset, Order};
//!
//! let base = Depset::leaf(vec!["base.h"], Order::Postorder);
//! let lib = Depset::new(vec!["lib.h"], vec![base.clone()], Order::Postorder).unwrap();
//! let app = Depset::new(vec!["app.h"], vec![lib, base], Order::Postorder).unwrap();
//!
//! assert_eq!(app.flatten(), vec!["base.h", "lib.h", "app.h"]);
//! ```
//!
//! Sets are `Send + Sync` whenever their elements are, so any number of
//! threads can flatten overlapping sets without locking.

mod flatten;
mod order;

pub use order::Order;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};

/// An immutable, structurally shared set of elements.
///
/// Cloning a `Depset` clones a handle. Two handles refer to the same node
/// iff they came from the same construction call, which
/// [`Depset::ptr_eq`] reports. There is intentionally no `PartialEq`:
/// comparing contents means flattening both sides, and callers should do
/// that explicitly.
pub struct Depset<T> {
    node: Arc<Node<T>>,
}

struct Node<T> {
    order: Order,
    direct: Vec<T>,
    transitive: Vec<Depset<T>>,
    /// No element anywhere in this node or below it.
    empty: bool,
}

impl<T> Depset<T> {
    /// Builds a set from direct elements and child sets.
    ///
    /// Every non-empty child must have been built with an order `order`
    /// accepts (see [`Order::accepts`]). Empty children combine with any
    /// order. On error nothing is constructed.
    pub fn new(direct: Vec<T>, transitive: Vec<Depset<T>>, order: Order) -> Result<Self> {
        if let Some(child) = transitive
            .iter()
            .find(|child| !child.is_empty() && !order.accepts(child.order()))
        {
            return Err(Error::IncompatibleOrder {
                expected: order,
                found: child.order(),
            });
        }

        let empty = direct.is_empty() && transitive.iter().all(Depset::is_empty);
        Ok(Self {
            node: Arc::new(Node {
                order,
                direct,
                transitive,
                empty,
            }),
        })
    }

    /// A set holding only `direct` elements.
    pub fn leaf(direct: Vec<T>, order: Order) -> Self {
        let empty = direct.is_empty();
        Self {
            node: Arc::new(Node {
                order,
                direct,
                transitive: Vec::new(),
                empty,
            }),
        }
    }

    /// A set with no elements.
    pub fn empty(order: Order) -> Self {
        Self::leaf(Vec::new(), order)
    }

    pub fn order(&self) -> Order {
        self.node.order
    }

    /// This node's own elements, in insertion order.
    pub fn direct(&self) -> &[T] {
        &self.node.direct
    }

    /// This node's children, in insertion order.
    pub fn transitive(&self) -> &[Depset<T>] {
        &self.node.transitive
    }

    /// Whether flattening would yield nothing. O(1).
    pub fn is_empty(&self) -> bool {
        self.node.empty
    }

    /// Whether two handles refer to the same node.
    pub fn ptr_eq(a: &Depset<T>, b: &Depset<T>) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }

    /// Number of live handles to this node, including `self`.
    ///
    /// Each parent that lists the node as a child holds one handle.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.node)
    }

    /// Identity of the node, stable for as long as the node is alive.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.node) as *const () as usize
    }
}

impl<T: Eq + Hash> Depset<T> {
    /// Like [`Depset::flatten`], borrowing the elements instead of cloning.
    pub fn elements(&self) -> Vec<&T> {
        flatten::walk(self).0
    }
}

impl<T: Eq + Hash + Clone> Depset<T> {
    /// Expands the set into a list holding every distinct element once.
    ///
    /// The layout follows [`Depset::order`]. When the same element is
    /// reachable through several nodes its first occurrence in the walk
    /// wins. The result is the same every time it is called on the same
    /// set.
    pub fn flatten(&self) -> Vec<T> {
        let (elements, nodes) = flatten::walk(self);
        debug!(
            "Flattened {} set: {} nodes, {} elements",
            self.order(),
            nodes,
            elements.len()
        );
        elements.into_iter().cloned().collect()
    }

    /// The elements of [`Depset::flatten`] as a set.
    pub fn to_set(&self) -> HashSet<T> {
        let (elements, _) = flatten::walk(self);
        elements.into_iter().cloned().collect()
    }

    /// Number of distinct nodes reachable from this one, itself included.
    pub fn node_count(&self) -> usize {
        flatten::count_nodes(self)
    }

    /// Explicitly converts the set into another order.
    ///
    /// The result is a fresh leaf holding this set's flattened elements, so
    /// it may be combined with sets of `order` afterwards.
    pub fn converted(&self, order: Order) -> Depset<T> {
        Depset::leaf(self.flatten(), order)
    }
}

impl<T> Drop for Node<T> {
    // Unlinks uniquely owned descendants one at a time so that dropping a
    // very deep chain does not recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.transitive);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child.node) {
                pending.append(&mut node.transitive);
            }
        }
    }
}

impl<T> Clone for Depset<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Depset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Depset")
            .field("order", &self.node.order)
            .field("direct", &self.node.direct)
            .field("transitive", &self.node.transitive.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mixed_orders() {
        let child = Depset::leaf(vec!["b"], Order::Postorder);
        let err = Depset::new(vec!["a"], vec![child], Order::Preorder).unwrap_err();
        match err {
            Error::IncompatibleOrder { expected, found } => {
                assert_eq!(expected, Order::Preorder);
                assert_eq!(found, Order::Postorder);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_new_rejects_unordered_child_in_ordered_parent() {
        let child = Depset::leaf(vec!["b"], Order::Unordered);
        assert!(Depset::new(vec!["a"], vec![child], Order::Topological).is_err());
    }

    #[test]
    fn test_unordered_parent_accepts_any_child() {
        let children: Vec<_> = Order::ALL
            .iter()
            .map(|order| Depset::leaf(vec![order.as_str()], *order))
            .collect();
        let set = Depset::new(vec![], children, Order::Unordered).unwrap();
        assert_eq!(set.flatten().len(), 4);
    }

    #[test]
    fn test_empty_child_combines_with_any_order() {
        let empty = Depset::<&str>::empty(Order::Postorder);
        let set = Depset::new(vec!["a"], vec![empty], Order::Preorder).unwrap();
        assert_eq!(set.flatten(), vec!["a"]);
    }

    #[test]
    fn test_is_empty_tracks_descendants() {
        let empty = Depset::<&str>::empty(Order::Unordered);
        let still_empty = Depset::new(vec![], vec![empty.clone()], Order::Unordered).unwrap();
        assert!(still_empty.is_empty());

        let leaf = Depset::leaf(vec!["x"], Order::Unordered);
        let not_empty = Depset::new(vec![], vec![empty, leaf], Order::Unordered).unwrap();
        assert!(!not_empty.is_empty());
    }

    #[test]
    fn test_children_are_shared_not_copied() {
        let shared = Depset::leaf(vec!["c"], Order::Postorder);
        let parents: Vec<_> = (0..10)
            .map(|_| Depset::new(vec![], vec![shared.clone()], Order::Postorder).unwrap())
            .collect();

        // One handle held here plus one per parent, all pointing at one node.
        assert_eq!(shared.handle_count(), 11);
        for parent in &parents {
            assert!(Depset::ptr_eq(&parent.transitive()[0], &shared));
        }

        drop(parents);
        assert_eq!(shared.handle_count(), 1);
    }

    #[test]
    fn test_identity_is_per_construction() {
        let a = Depset::leaf(vec![1], Order::Unordered);
        let b = Depset::leaf(vec![1], Order::Unordered);
        assert!(Depset::ptr_eq(&a, &a.clone()));
        assert!(!Depset::ptr_eq(&a, &b));
    }

    #[test]
    fn test_converted_can_join_other_order() {
        let post = Depset::new(
            vec!["a"],
            vec![Depset::leaf(vec!["b"], Order::Postorder)],
            Order::Postorder,
        )
        .unwrap();
        let pre = post.converted(Order::Preorder);
        assert_eq!(pre.order(), Order::Preorder);
        assert_eq!(pre.direct(), &["b", "a"]);

        let parent = Depset::new(vec!["root"], vec![pre], Order::Preorder).unwrap();
        assert_eq!(parent.flatten(), vec!["root", "b", "a"]);
    }

    #[test]
    fn test_to_set_matches_flatten() {
        let y = Depset::leaf(vec!["b", "c"], Order::Preorder);
        let x = Depset::new(vec!["a", "b"], vec![y], Order::Preorder).unwrap();
        let set = x.to_set();
        assert_eq!(set.len(), 3);
        for element in x.flatten() {
            assert!(set.contains(element));
        }
    }

    #[test]
    fn test_node_count_counts_shared_nodes_once() {
        let shared = Depset::leaf(vec!["s"], Order::Unordered);
        let left = Depset::new(vec!["l"], vec![shared.clone()], Order::Unordered).unwrap();
        let right = Depset::new(vec!["r"], vec![shared], Order::Unordered).unwrap();
        let root = Depset::new(vec![], vec![left, right], Order::Unordered).unwrap();
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_depset_is_send_and_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Depset<String>>();
    }
}
