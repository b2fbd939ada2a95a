//! Height-balanced (AVL) search tree over the arena node store.
//!
//! Insert and remove are recursive and rebalance bottom-up. Under
//! `BalanceStrategy::BalanceFactor` a "height changed" signal travels back up
//! and balances are updated by case; under `BalanceStrategy::Height` every
//! ancestor on the path is refreshed from cached heights and checked.

use std::cmp::Ordering;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::NodeStore;
use crate::domain::entities::{
    BalanceStrategy, InsertOutcome, Key, RemoveOutcome, Tally, TreeOptions,
};
use crate::domain::error::{InvariantViolation, TreeResult};
use crate::domain::invariant;
use crate::domain::rotation::{self, rotate_ll, rotate_lr, rotate_rl, rotate_rr, Rotated};
use crate::domain::view::TreeView;

/// One level of the balance-factor insert, reported to the parent.
#[derive(Debug, Clone, Copy)]
struct Grown {
    root: Index,
    outcome: InsertOutcome,
    height_changed: bool,
}

/// One level of a remove, reported to the parent.
#[derive(Debug, Clone, Copy)]
struct Shrunk {
    root: Option<Index>,
    outcome: RemoveOutcome,
    height_changed: bool,
}

impl Shrunk {
    fn unchanged(root: Option<Index>) -> Self {
        Self {
            root,
            outcome: RemoveOutcome::Absent,
            height_changed: false,
        }
    }
}

#[derive(Debug)]
pub struct AvlTree {
    store: NodeStore,
    root: Option<Index>,
    options: TreeOptions,
}

impl Default for AvlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AvlTree {
    pub fn new() -> Self {
        Self::with_options(TreeOptions::default())
    }

    pub fn with_options(options: TreeOptions) -> Self {
        Self {
            store: NodeStore::with_limit(options.node_limit),
            root: None,
            options,
        }
    }

    /// Builds a tree by inserting `keys` in order; duplicates are skipped.
    pub fn from_keys<I>(keys: I, options: TreeOptions) -> TreeResult<Self>
    where
        I: IntoIterator<Item = Key>,
    {
        let mut tree = Self::with_options(options);
        let mut tally = Tally::default();
        tree.extend_keys(keys, &mut tally)?;
        debug!(
            inserted = tally.inserted,
            duplicates = tally.duplicates,
            "built AVL tree"
        );
        Ok(tree)
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn strategy(&self) -> BalanceStrategy {
        self.options.strategy
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts `key`, keeping the tree height-balanced.
    ///
    /// A key already present is reported as [`InsertOutcome::Duplicate`].
    /// Fails only when the node limit is reached, in which case the tree is
    /// left exactly as it was.
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&mut self, key: Key) -> TreeResult<InsertOutcome> {
        let (root, outcome) = match self.options.strategy {
            BalanceStrategy::BalanceFactor => {
                let grown = self.insert_factor(self.root, key)?;
                (grown.root, grown.outcome)
            }
            BalanceStrategy::Height => self.insert_height(self.root, key)?,
        };
        self.root = Some(root);
        if outcome.is_inserted() {
            self.verify_after("insert", key);
        }
        Ok(outcome)
    }

    /// Removes `key`, rebalancing every ancestor on the way back up.
    ///
    /// A node with two children takes the key of its in-order successor,
    /// whose own node is then removed from the right subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, key: Key) -> RemoveOutcome {
        let shrunk = match self.options.strategy {
            BalanceStrategy::BalanceFactor => self.remove_factor(self.root, key),
            BalanceStrategy::Height => self.remove_height(self.root, key),
        };
        self.root = shrunk.root;
        if shrunk.outcome.is_removed() {
            self.verify_after("remove", key);
        }
        shrunk.outcome
    }

    pub fn contains(&self, key: Key) -> bool {
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.store.node(idx);
            cur = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return true,
            };
        }
        false
    }

    pub fn min(&self) -> Option<Key> {
        self.root
            .map(|root| self.store.node(self.store.leftmost(root)).key)
    }

    pub fn max(&self) -> Option<Key> {
        self.root
            .map(|root| self.store.node(self.store.rightmost(root)).key)
    }

    pub fn extend_keys<I>(&mut self, keys: I, tally: &mut Tally) -> TreeResult<()>
    where
        I: IntoIterator<Item = Key>,
    {
        for key in keys {
            tally.record_insert(self.insert(key)?);
        }
        Ok(())
    }

    /// Releases every node in post-order. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let root = self.root.take();
        self.store.drain_postorder(root)
    }

    /// Full structural check: order, cached heights, balances, reachability.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        invariant::check_balanced(&self.store, self.root)
    }

    fn verify_after(&self, op: &str, key: Key) {
        if cfg!(debug_assertions) && self.options.verify {
            if let Err(violation) = self.check_invariants() {
                panic!("AVL invariant violated after {op} of {key}: {violation}");
            }
        }
    }

    // ------------------------------------------------------------------
    // Balance-factor formulation
    // ------------------------------------------------------------------

    fn insert_factor(&mut self, link: Option<Index>, key: Key) -> TreeResult<Grown> {
        let Some(p) = link else {
            return Ok(Grown {
                root: self.store.alloc(key)?,
                outcome: InsertOutcome::Inserted,
                height_changed: true,
            });
        };

        match key.cmp(&self.store.node(p).key) {
            Ordering::Equal => Ok(Grown {
                root: p,
                outcome: InsertOutcome::Duplicate,
                height_changed: false,
            }),
            Ordering::Less => {
                let child = self.insert_factor(self.store.node(p).left, key)?;
                self.store.node_mut(p).left = Some(child.root);
                if !child.height_changed {
                    return Ok(Grown { root: p, ..child });
                }
                Ok(self.left_grew(p))
            }
            Ordering::Greater => {
                let child = self.insert_factor(self.store.node(p).right, key)?;
                self.store.node_mut(p).right = Some(child.root);
                if !child.height_changed {
                    return Ok(Grown { root: p, ..child });
                }
                Ok(self.right_grew(p))
            }
        }
    }

    fn left_grew(&mut self, p: Index) -> Grown {
        let (root, height_changed) = match self.store.node(p).balance {
            -1 => {
                self.store.node_mut(p).balance = 0;
                (p, false)
            }
            0 => {
                self.store.node_mut(p).balance = 1;
                self.store.refresh_height(p);
                (p, true)
            }
            _ => {
                let q = self.store.node(p).left.expect("left subtree just grew");
                let rotated = if self.store.node(q).balance >= 0 {
                    rotate_ll(&mut self.store, p)
                } else {
                    rotate_lr(&mut self.store, p)
                };
                self.log_rotation(p, rotated);
                (rotated.root, false)
            }
        };
        Grown {
            root,
            outcome: InsertOutcome::Inserted,
            height_changed,
        }
    }

    fn right_grew(&mut self, p: Index) -> Grown {
        let (root, height_changed) = match self.store.node(p).balance {
            1 => {
                self.store.node_mut(p).balance = 0;
                (p, false)
            }
            0 => {
                self.store.node_mut(p).balance = -1;
                self.store.refresh_height(p);
                (p, true)
            }
            _ => {
                let q = self.store.node(p).right.expect("right subtree just grew");
                let rotated = if self.store.node(q).balance <= 0 {
                    rotate_rr(&mut self.store, p)
                } else {
                    rotate_rl(&mut self.store, p)
                };
                self.log_rotation(p, rotated);
                (rotated.root, false)
            }
        };
        Grown {
            root,
            outcome: InsertOutcome::Inserted,
            height_changed,
        }
    }

    fn remove_factor(&mut self, link: Option<Index>, key: Key) -> Shrunk {
        let Some(p) = link else {
            return Shrunk::unchanged(None);
        };

        match key.cmp(&self.store.node(p).key) {
            Ordering::Less => {
                let child = self.remove_factor(self.store.node(p).left, key);
                self.store.node_mut(p).left = child.root;
                if !child.height_changed {
                    return Shrunk {
                        root: Some(p),
                        ..child
                    };
                }
                self.left_shrank(p)
            }
            Ordering::Greater => {
                let child = self.remove_factor(self.store.node(p).right, key);
                self.store.node_mut(p).right = child.root;
                if !child.height_changed {
                    return Shrunk {
                        root: Some(p),
                        ..child
                    };
                }
                self.right_shrank(p)
            }
            Ordering::Equal => {
                let node = self.store.node(p);
                match (node.left, node.right) {
                    (None, child) | (child, None) => {
                        self.store.release(p);
                        trace!(key, "unlinked node with at most one child");
                        Shrunk {
                            root: child,
                            outcome: RemoveOutcome::Removed,
                            height_changed: true,
                        }
                    }
                    (Some(_), Some(right)) => {
                        let successor = self.store.node(self.store.leftmost(right)).key;
                        trace!(key, successor, "promoting in-order successor");
                        self.store.node_mut(p).key = successor;
                        let child = self.remove_factor(Some(right), successor);
                        self.store.node_mut(p).right = child.root;
                        if !child.height_changed {
                            return Shrunk {
                                root: Some(p),
                                ..child
                            };
                        }
                        self.right_shrank(p)
                    }
                }
            }
        }
    }

    fn left_shrank(&mut self, p: Index) -> Shrunk {
        let (root, height_changed) = match self.store.node(p).balance {
            1 => {
                self.store.node_mut(p).balance = 0;
                self.store.refresh_height(p);
                (p, true)
            }
            0 => {
                self.store.node_mut(p).balance = -1;
                (p, false)
            }
            _ => {
                let q = self.store.node(p).right.expect("right-heavy node has a right child");
                let rotated = if self.store.node(q).balance <= 0 {
                    rotate_rr(&mut self.store, p)
                } else {
                    rotate_rl(&mut self.store, p)
                };
                self.log_rotation(p, rotated);
                (rotated.root, rotated.shrunk)
            }
        };
        Shrunk {
            root: Some(root),
            outcome: RemoveOutcome::Removed,
            height_changed,
        }
    }

    fn right_shrank(&mut self, p: Index) -> Shrunk {
        let (root, height_changed) = match self.store.node(p).balance {
            -1 => {
                self.store.node_mut(p).balance = 0;
                self.store.refresh_height(p);
                (p, true)
            }
            0 => {
                self.store.node_mut(p).balance = 1;
                (p, false)
            }
            _ => {
                let q = self.store.node(p).left.expect("left-heavy node has a left child");
                let rotated = if self.store.node(q).balance >= 0 {
                    rotate_ll(&mut self.store, p)
                } else {
                    rotate_lr(&mut self.store, p)
                };
                self.log_rotation(p, rotated);
                (rotated.root, rotated.shrunk)
            }
        };
        Shrunk {
            root: Some(root),
            outcome: RemoveOutcome::Removed,
            height_changed,
        }
    }

    fn log_rotation(&self, pivot: Index, rotated: Rotated) {
        trace!(
            pivot = self.store.node(pivot).key,
            case = %rotated.case,
            shrunk = rotated.shrunk,
            "balance-factor rotation"
        );
    }

    // ------------------------------------------------------------------
    // Recomputed-height formulation
    // ------------------------------------------------------------------

    fn insert_height(
        &mut self,
        link: Option<Index>,
        key: Key,
    ) -> TreeResult<(Index, InsertOutcome)> {
        let Some(p) = link else {
            return Ok((self.store.alloc(key)?, InsertOutcome::Inserted));
        };

        let outcome = match key.cmp(&self.store.node(p).key) {
            Ordering::Equal => InsertOutcome::Duplicate,
            Ordering::Less => {
                let (child, outcome) = self.insert_height(self.store.node(p).left, key)?;
                self.store.node_mut(p).left = Some(child);
                outcome
            }
            Ordering::Greater => {
                let (child, outcome) = self.insert_height(self.store.node(p).right, key)?;
                self.store.node_mut(p).right = Some(child);
                outcome
            }
        };
        if !outcome.is_inserted() {
            return Ok((p, outcome));
        }
        let (root, case) = rotation::rebalance(&mut self.store, p);
        if let Some(case) = case {
            trace!(key, pivot = self.store.node(p).key, %case, "height rebalance after insert");
        }
        Ok((root, outcome))
    }

    fn remove_height(&mut self, link: Option<Index>, key: Key) -> Shrunk {
        let Some(p) = link else {
            return Shrunk::unchanged(None);
        };

        let outcome = match key.cmp(&self.store.node(p).key) {
            Ordering::Less => {
                let child = self.remove_height(self.store.node(p).left, key);
                self.store.node_mut(p).left = child.root;
                child.outcome
            }
            Ordering::Greater => {
                let child = self.remove_height(self.store.node(p).right, key);
                self.store.node_mut(p).right = child.root;
                child.outcome
            }
            Ordering::Equal => {
                let node = self.store.node(p);
                match (node.left, node.right) {
                    (None, child) | (child, None) => {
                        self.store.release(p);
                        return Shrunk {
                            root: child,
                            outcome: RemoveOutcome::Removed,
                            height_changed: true,
                        };
                    }
                    (Some(_), Some(right)) => {
                        let successor = self.store.node(self.store.leftmost(right)).key;
                        self.store.node_mut(p).key = successor;
                        let child = self.remove_height(Some(right), successor);
                        self.store.node_mut(p).right = child.root;
                        child.outcome
                    }
                }
            }
        };
        if !outcome.is_removed() {
            return Shrunk::unchanged(Some(p));
        }
        let before = self.store.node(p).height;
        let (root, case) = rotation::rebalance(&mut self.store, p);
        if let Some(case) = case {
            trace!(key, pivot = self.store.node(p).key, %case, "height rebalance after remove");
        }
        Shrunk {
            root: Some(root),
            outcome,
            height_changed: self.store.node(root).height != before,
        }
    }
}

impl TreeView for AvlTree {
    fn store(&self) -> &NodeStore {
        &self.store
    }

    fn root(&self) -> Option<Index> {
        self.root
    }
}
