//! Iterative DAG walks behind `Depset::flatten`.
//!
//! Each walk keeps its own visited set keyed by node identity, so shared
//! nodes are expanded once per call and concurrent walks never touch the
//! same scratch state. The walks use an explicit stack; a chain of sets many
//! thousands deep flattens without recursion.

use std::collections::HashSet;
use std::hash::Hash;

use super::{Depset, Order};

/// Collects every distinct element reachable from `root` in `root`'s order.
///
/// Returns the elements plus the number of nodes visited.
pub(super) fn walk<T: Eq + Hash>(root: &Depset<T>) -> (Vec<&T>, usize) {
    let mut out = Elements::default();
    let nodes = match root.order() {
        Order::Preorder => preorder(root, &mut out),
        // A memoized postorder walk of a DAG lists every node after all of
        // its descendants, which is a valid topological layout. Children are
        // taken in list order, so the first-encountered branch wins ties.
        Order::Unordered | Order::Postorder | Order::Topological => postorder(root, &mut out),
    };
    (out.list, nodes)
}

pub(super) fn count_nodes<T>(root: &Depset<T>) -> usize {
    let mut visited = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if visited.insert(node.id()) {
            stack.extend(node.transitive());
        }
    }
    visited.len()
}

/// First-occurrence deduplicating sink.
struct Elements<'a, T> {
    seen: HashSet<&'a T>,
    list: Vec<&'a T>,
}

impl<T> Default for Elements<'_, T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            list: Vec::new(),
        }
    }
}

impl<'a, T: Eq + Hash> Elements<'a, T> {
    fn extend(&mut self, direct: &'a [T]) {
        for element in direct {
            if self.seen.insert(element) {
                self.list.push(element);
            }
        }
    }
}

fn preorder<'a, T: Eq + Hash>(root: &'a Depset<T>, out: &mut Elements<'a, T>) -> usize {
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if !visited.insert(node.id()) {
            continue;
        }
        out.extend(node.direct());
        // Reversed so the first child is popped first.
        for child in node.transitive().iter().rev() {
            if !visited.contains(&child.id()) {
                stack.push(child);
            }
        }
    }

    visited.len()
}

fn postorder<'a, T: Eq + Hash>(root: &'a Depset<T>, out: &mut Elements<'a, T>) -> usize {
    let mut visited = HashSet::new();
    // (node, index of the next child to descend into)
    let mut stack: Vec<(&'a Depset<T>, usize)> = vec![(root, 0)];
    visited.insert(root.id());

    while let Some(top) = stack.len().checked_sub(1) {
        let (node, next) = stack[top];
        match node.transitive().get(next) {
            Some(child) => {
                stack[top].1 += 1;
                if visited.insert(child.id()) {
                    stack.push((child, 0));
                }
            }
            None => {
                out.extend(node.direct());
                stack.pop();
            }
        }
    }

    visited.len()
}
