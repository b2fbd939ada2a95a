//! Perfectly balanced search tree built from a sorted key set.
//!
//! Reference baseline for AVL statistics: the midpoint of every key range
//! becomes the subtree root.

use generational_arena::Index;
use itertools::Itertools;
use tracing::debug;

use crate::domain::arena::NodeStore;
use crate::domain::entities::Key;
use crate::domain::error::{InvariantViolation, TreeResult};
use crate::domain::invariant;
use crate::domain::view::TreeView;

#[derive(Debug, Default)]
pub struct PerfectTree {
    store: NodeStore,
    root: Option<Index>,
}

impl PerfectTree {
    /// Sorts and deduplicates `keys`, then builds by midpoint split.
    pub fn from_keys<I>(keys: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = Key>,
    {
        let sorted: Vec<Key> = keys.into_iter().sorted_unstable().dedup().collect();
        Self::from_sorted(&sorted)
    }

    /// `sorted` must be strictly ascending.
    pub fn from_sorted(sorted: &[Key]) -> TreeResult<Self> {
        debug_assert!(sorted.windows(2).all(|w| w[0] < w[1]), "keys not strictly ascending");
        let mut store = NodeStore::new();
        let root = build(&mut store, sorted)?;
        debug!(size = sorted.len(), "built perfectly balanced tree");
        Ok(Self { store, root })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        invariant::check_balanced(&self.store, self.root)
    }
}

/// Middle element (lower middle for even lengths) becomes the root.
fn build(store: &mut NodeStore, keys: &[Key]) -> TreeResult<Option<Index>> {
    if keys.is_empty() {
        return Ok(None);
    }
    let mid = (keys.len() - 1) / 2;
    let idx = store.alloc(keys[mid])?;
    let left = build(store, &keys[..mid])?;
    let right = build(store, &keys[mid + 1..])?;
    let node = store.node_mut(idx);
    node.left = left;
    node.right = right;
    store.refresh(idx);
    Ok(Some(idx))
}

impl TreeView for PerfectTree {
    fn store(&self) -> &NodeStore {
        &self.store
    }

    fn root(&self) -> Option<Index> {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_seven_keys_when_built_then_complete_tree() {
        let tree = PerfectTree::from_keys([70, 20, 50, 40, 80, 30, 60]).unwrap();
        assert_eq!(tree.store().node(tree.root().unwrap()).key, 50);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.average_leaf_depth(), 2.0);
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn given_duplicates_when_built_then_each_key_once() {
        let tree = PerfectTree::from_keys([3, 1, 3, 2, 1]).unwrap();
        assert_eq!(tree.keys(), vec![1, 2, 3]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn given_hundred_keys_when_built_then_height_is_minimal() {
        let tree = PerfectTree::from_keys(0..100).unwrap();
        // ceil(log2(101)) = 7
        assert_eq!(tree.height(), 7);
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn given_no_keys_when_built_then_empty() {
        let tree = PerfectTree::from_keys(std::iter::empty()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }
}
