//! Property-based tests for set flattening.
//!
//! These tests use proptest to generate random DAGs of shared sets and verify
//! that flattening invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::depset::{Depset, Order};
    use proptest::prelude::*;
    use proptest::sample::Index;
    use std::collections::HashSet;

    /// A generated node: its direct elements and picks among earlier nodes.
    type NodeSpec = (Vec<u8>, Vec<Index>);

    fn dag_strategy() -> impl Strategy<Value = Vec<NodeSpec>> {
        prop::collection::vec(
            (
                prop::collection::vec(0u8..24, 0..4),
                prop::collection::vec(any::<Index>(), 0..3),
            ),
            1..16,
        )
    }

    fn order_strategy() -> impl Strategy<Value = Order> {
        prop::sample::select(Order::ALL.to_vec())
    }

    /// Child indices of node `i`; only earlier nodes can be children.
    fn children_of(specs: &[NodeSpec], i: usize) -> Vec<usize> {
        if i == 0 {
            return vec![];
        }
        specs[i].1.iter().map(|pick| pick.index(i)).collect()
    }

    /// Builds every node and returns them; the last one is the root.
    fn build<T: Clone>(
        specs: &[NodeSpec],
        order: Order,
        direct: impl Fn(usize) -> Vec<T>,
    ) -> Vec<Depset<T>> {
        let mut nodes: Vec<Depset<T>> = Vec::with_capacity(specs.len());
        for i in 0..specs.len() {
            let children = children_of(specs, i)
                .into_iter()
                .map(|c| nodes[c].clone())
                .collect();
            nodes.push(Depset::new(direct(i), children, order).unwrap());
        }
        nodes
    }

    /// Every element reachable from node `i`, computed without sharing.
    fn reachable(specs: &[NodeSpec], i: usize, out: &mut HashSet<u8>) {
        out.extend(specs[i].0.iter().copied());
        for child in children_of(specs, i) {
            reachable(specs, child, out);
        }
    }

    proptest! {
        /// Property: flatten never emits an element twice
        #[test]
        fn flatten_has_no_duplicates(specs in dag_strategy(), order in order_strategy()) {
            let nodes = build(&specs, order, |i| specs[i].0.clone());
            let root = nodes.last().unwrap();
            let flat = root.flatten();
            let unique: HashSet<u8> = flat.iter().copied().collect();
            prop_assert_eq!(unique.len(), flat.len());
        }

        /// Property: flatten contains exactly the reachable elements
        #[test]
        fn flatten_matches_naive_union(specs in dag_strategy(), order in order_strategy()) {
            let nodes = build(&specs, order, |i| specs[i].0.clone());
            let root = nodes.last().unwrap();

            let mut expected = HashSet::new();
            reachable(&specs, specs.len() - 1, &mut expected);

            let flat: HashSet<u8> = root.flatten().into_iter().collect();
            prop_assert_eq!(&flat, &expected);
            prop_assert_eq!(root.to_set(), expected);
        }

        /// Property: flatten is deterministic and does not change the set
        #[test]
        fn flatten_is_idempotent(specs in dag_strategy(), order in order_strategy()) {
            let nodes = build(&specs, order, |i| specs[i].0.clone());
            let root = nodes.last().unwrap();
            prop_assert_eq!(root.flatten(), root.flatten());
        }

        /// Property: in postorder and topological order every node's element
        /// comes after the elements of the nodes it includes
        #[test]
        fn children_precede_parents(
            specs in dag_strategy(),
            order in prop::sample::select(vec![Order::Postorder, Order::Topological]),
        ) {
            let nodes = build(&specs, order, |i| vec![i]);
            let root = nodes.last().unwrap();
            let flat = root.flatten();
            let position = |node: usize| flat.iter().position(|e| *e == node);

            for &node in &flat {
                for child in children_of(&specs, node) {
                    let child_pos = position(child);
                    prop_assert!(child_pos.is_some());
                    prop_assert!(child_pos < position(node));
                }
            }
        }

        /// Property: in preorder the root's own elements come first
        #[test]
        fn preorder_starts_with_root(specs in dag_strategy()) {
            let nodes = build(&specs, Order::Preorder, |i| vec![i]);
            let root = nodes.last().unwrap();
            prop_assert_eq!(root.flatten().first().copied(), Some(specs.len() - 1));
        }

        /// Property: each distinct node is walked once, however often it is shared
        #[test]
        fn node_count_counts_distinct_nodes(specs in dag_strategy()) {
            let nodes = build(&specs, Order::Postorder, |i| vec![i]);
            let root = nodes.last().unwrap();
            prop_assert_eq!(root.node_count(), root.flatten().len());
        }
    }
}
