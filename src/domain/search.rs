//! Unbalanced binary search tree, kept as a baseline for comparisons.
//!
//! Nodes never carry valid balance or height caches here.

use std::cmp::Ordering;

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::{Node, NodeStore};
use crate::domain::entities::{InsertOutcome, Key, RemoveOutcome};
use crate::domain::error::{InvariantViolation, TreeResult};
use crate::domain::invariant;
use crate::domain::view::TreeView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Deepest search path [`SearchTree::insert_recursive`] descends by recursion.
pub const RECURSION_LIMIT: usize = 4096;

/// Parent link of a node: `None` means the tree root slot.
type Slot = Option<(Index, Side)>;

#[derive(Debug, Default)]
pub struct SearchTree {
    store: NodeStore,
    root: Option<Index>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(node_limit: Option<usize>) -> Self {
        Self {
            store: NodeStore::with_limit(node_limit),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn link_mut(&mut self, slot: Slot) -> &mut Option<Index> {
        match slot {
            None => &mut self.root,
            Some((parent, Side::Left)) => &mut self.store.node_mut(parent).left,
            Some((parent, Side::Right)) => &mut self.store.node_mut(parent).right,
        }
    }

    /// Walks down to the slot holding `key`, or the empty slot where it belongs.
    fn find_slot(&self, key: Key) -> (Slot, Option<Index>) {
        let mut slot = None;
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.store.node(idx);
            let (side, next) = match key.cmp(&node.key) {
                Ordering::Less => (Side::Left, node.left),
                Ordering::Greater => (Side::Right, node.right),
                Ordering::Equal => break,
            };
            slot = Some((idx, side));
            cur = next;
        }
        (slot, cur)
    }

    /// Number of nodes visited when searching for `key`.
    fn path_len(&self, key: Key) -> usize {
        let mut depth = 0;
        let mut cur = self.root;
        while let Some(idx) = cur {
            depth += 1;
            let node = self.store.node(idx);
            cur = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => None,
            };
        }
        depth
    }

    /// Iterative insert: descend by slot and fill the empty one.
    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, key: Key) -> TreeResult<InsertOutcome> {
        let (slot, found) = self.find_slot(key);
        if found.is_some() {
            return Ok(InsertOutcome::Duplicate);
        }
        let idx = self.store.alloc(key)?;
        *self.link_mut(slot) = Some(idx);
        Ok(InsertOutcome::Inserted)
    }

    /// Recursive insert returning the subtree root to each caller.
    ///
    /// Recursion depth equals the length of the search path. Paths longer
    /// than [`RECURSION_LIMIT`] are handled by the iterative [`insert`],
    /// which yields the same tree.
    ///
    /// [`insert`]: SearchTree::insert
    pub fn insert_recursive(&mut self, key: Key) -> TreeResult<InsertOutcome> {
        let depth = self.path_len(key);
        if depth > RECURSION_LIMIT {
            trace!(key, depth, "search path too deep for recursion, inserting iteratively");
            return self.insert(key);
        }
        let (root, outcome) = self.insert_at(self.root, key)?;
        self.root = Some(root);
        Ok(outcome)
    }

    fn insert_at(&mut self, link: Option<Index>, key: Key) -> TreeResult<(Index, InsertOutcome)> {
        let Some(p) = link else {
            return Ok((self.store.alloc(key)?, InsertOutcome::Inserted));
        };
        let outcome = match key.cmp(&self.store.node(p).key) {
            Ordering::Equal => InsertOutcome::Duplicate,
            Ordering::Less => {
                let (child, outcome) = self.insert_at(self.store.node(p).left, key)?;
                self.store.node_mut(p).left = Some(child);
                outcome
            }
            Ordering::Greater => {
                let (child, outcome) = self.insert_at(self.store.node(p).right, key)?;
                self.store.node_mut(p).right = Some(child);
                outcome
            }
        };
        Ok((p, outcome))
    }

    /// Removes `key` without rebalancing. A node with two children takes its
    /// in-order successor's key and the successor node is spliced out.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, key: Key) -> RemoveOutcome {
        let (slot, found) = self.find_slot(key);
        let Some(target) = found else {
            return RemoveOutcome::Absent;
        };

        let node = self.store.node(target);
        match (node.left, node.right) {
            (None, child) | (child, None) => {
                *self.link_mut(slot) = child;
                self.store.release(target);
            }
            (Some(_), Some(right)) => {
                let mut successor_slot = (target, Side::Right);
                let mut successor = right;
                while let Some(left) = self.store.node(successor).left {
                    successor_slot = (successor, Side::Left);
                    successor = left;
                }
                let Node {
                    key: successor_key,
                    right: successor_right,
                    ..
                } = *self.store.node(successor);
                trace!(key, successor_key, "promoting in-order successor");
                self.store.node_mut(target).key = successor_key;
                *self.link_mut(Some(successor_slot)) = successor_right;
                self.store.release(successor);
            }
        }
        RemoveOutcome::Removed
    }

    pub fn contains(&self, key: Key) -> bool {
        self.find_slot(key).1.is_some()
    }

    pub fn clear(&mut self) -> usize {
        let root = self.root.take();
        self.store.drain_postorder(root)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        invariant::check_order(&self.store, self.root)
    }
}

impl TreeView for SearchTree {
    fn store(&self) -> &NodeStore {
        &self.store
    }

    fn root(&self) -> Option<Index> {
        self.root
    }

    fn label(&self, node: &Node) -> String {
        node.key.to_string()
    }
}
