//! Read-only traversals: size, checksum, height, depth averages.
//!
//! All walks use an explicit stack, so unbalanced trees of any height are
//! safe to measure.

use generational_arena::Index;
use serde::Serialize;

use crate::domain::arena::{Node, NodeStore};
use crate::domain::entities::Key;

/// Numbers describing one tree, as printed in comparison reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TreeSummary {
    pub size: usize,
    pub checksum: i64,
    pub height: u32,
    pub leaves: usize,
    /// Mean depth of leaves, root depth 0
    pub average_leaf_depth: f64,
    /// Mean level of all nodes, root level 1
    pub average_node_depth: f64,
}

/// Preorder walk yielding each node with its depth (root = 0).
pub struct Levels<'a> {
    store: &'a NodeStore,
    stack: Vec<(Index, u32)>,
}

impl<'a> Levels<'a> {
    pub fn new(store: &'a NodeStore, root: Option<Index>) -> Self {
        Self {
            store,
            stack: root.map(|r| (r, 0)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for Levels<'a> {
    type Item = (&'a Node, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, depth) = self.stack.pop()?;
        let node = self.store.node(idx);
        for child in [node.right, node.left].into_iter().flatten() {
            self.stack.push((child, depth + 1));
        }
        Some((node, depth))
    }
}

/// Ascending key sequence. Borrows the tree, so it can be restarted at will
/// and never observes a half-applied update.
pub struct Inorder<'a> {
    store: &'a NodeStore,
    stack: Vec<Index>,
}

impl<'a> Inorder<'a> {
    pub fn new(store: &'a NodeStore, root: Option<Index>) -> Self {
        let mut walk = Self {
            store,
            stack: Vec::new(),
        };
        walk.push_left_spine(root);
        walk
    }

    fn push_left_spine(&mut self, mut link: Option<Index>) {
        while let Some(idx) = link {
            self.stack.push(idx);
            link = self.store.node(idx).left;
        }
    }
}

impl<'a> Iterator for Inorder<'a> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let idx = self.stack.pop()?;
        let node = self.store.node(idx);
        self.push_left_spine(node.right);
        Some(node.key)
    }
}

pub fn size(store: &NodeStore, root: Option<Index>) -> usize {
    Levels::new(store, root).count()
}

pub fn checksum(store: &NodeStore, root: Option<Index>) -> i64 {
    Levels::new(store, root)
        .map(|(node, _)| i64::from(node.key))
        .sum()
}

/// Longest root-to-leaf path counted in nodes; empty tree = 0.
pub fn height(store: &NodeStore, root: Option<Index>) -> u32 {
    Levels::new(store, root)
        .map(|(_, depth)| depth + 1)
        .max()
        .unwrap_or(0)
}

pub fn leaf_count(store: &NodeStore, root: Option<Index>) -> usize {
    Levels::new(store, root)
        .filter(|(node, _)| node.is_leaf())
        .count()
}

pub fn average_leaf_depth(store: &NodeStore, root: Option<Index>) -> f64 {
    let (total, leaves) = Levels::new(store, root)
        .filter(|(node, _)| node.is_leaf())
        .fold((0u64, 0usize), |(total, leaves), (_, depth)| {
            (total + u64::from(depth), leaves + 1)
        });
    mean(total, leaves)
}

pub fn average_node_depth(store: &NodeStore, root: Option<Index>) -> f64 {
    let (total, nodes) = Levels::new(store, root)
        .fold((0u64, 0usize), |(total, nodes), (_, depth)| {
            (total + u64::from(depth) + 1, nodes + 1)
        });
    mean(total, nodes)
}

/// All summary numbers in a single walk.
pub fn summarize(store: &NodeStore, root: Option<Index>) -> TreeSummary {
    let mut size = 0usize;
    let mut checksum = 0i64;
    let mut height = 0u32;
    let mut leaves = 0usize;
    let mut leaf_depths = 0u64;
    let mut levels = 0u64;

    for (node, depth) in Levels::new(store, root) {
        size += 1;
        checksum += i64::from(node.key);
        height = height.max(depth + 1);
        levels += u64::from(depth) + 1;
        if node.is_leaf() {
            leaves += 1;
            leaf_depths += u64::from(depth);
        }
    }

    TreeSummary {
        size,
        checksum,
        height,
        leaves,
        average_leaf_depth: mean(leaf_depths, leaves),
        average_node_depth: mean(levels, size),
    }
}

fn mean(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 -> (1, 3 -> (_, 4))
    fn sample(store: &mut NodeStore) -> Index {
        let two = store.alloc(2).unwrap();
        let one = store.alloc(1).unwrap();
        let three = store.alloc(3).unwrap();
        let four = store.alloc(4).unwrap();
        store.node_mut(three).right = Some(four);
        store.node_mut(two).left = Some(one);
        store.node_mut(two).right = Some(three);
        two
    }

    #[test]
    fn given_empty_tree_when_measured_then_all_zero() {
        let store = NodeStore::new();
        let summary = summarize(&store, None);
        assert_eq!(summary.size, 0);
        assert_eq!(summary.height, 0);
        assert_eq!(summary.average_leaf_depth, 0.0);
        assert_eq!(summary.average_node_depth, 0.0);
        assert_eq!(Inorder::new(&store, None).count(), 0);
    }

    #[test]
    fn given_sample_when_measured_then_matches_hand_count() {
        let mut store = NodeStore::new();
        let root = Some(sample(&mut store));

        assert_eq!(size(&store, root), 4);
        assert_eq!(checksum(&store, root), 10);
        assert_eq!(height(&store, root), 3);
        assert_eq!(leaf_count(&store, root), 2);
        // leaves 1 (depth 1) and 4 (depth 2)
        assert_eq!(average_leaf_depth(&store, root), 1.5);
        // levels 1 + 2 + 2 + 3
        assert_eq!(average_node_depth(&store, root), 2.0);
        assert_eq!(
            summarize(&store, root),
            TreeSummary {
                size: 4,
                checksum: 10,
                height: 3,
                leaves: 2,
                average_leaf_depth: 1.5,
                average_node_depth: 2.0,
            }
        );
    }

    #[test]
    fn given_sample_when_inorder_then_ascending_and_restartable() {
        let mut store = NodeStore::new();
        let root = Some(sample(&mut store));
        let first: Vec<Key> = Inorder::new(&store, root).collect();
        let second: Vec<Key> = Inorder::new(&store, root).collect();
        assert_eq!(first, vec![1, 2, 3, 4]);
        assert_eq!(first, second);
    }
}
