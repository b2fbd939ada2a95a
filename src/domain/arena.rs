use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::entities::Key;
use crate::domain::error::{DomainError, TreeResult};

/// Tree node stored in the arena.
///
/// `height` and `balance` are caches maintained by the balanced trees
/// (leaf height = 1, balance = height(left) - height(right)). The plain
/// search tree leaves them at their initial values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub key: Key,
    pub balance: i8,
    pub height: u32,
    /// Index of the left child in the arena, None for an empty subtree
    pub left: Option<Index>,
    /// Index of the right child in the arena, None for an empty subtree
    pub right: Option<Index>,
}

impl Node {
    fn leaf(key: Key) -> Self {
        Self {
            key,
            balance: 0,
            height: 1,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena-backed node storage shared by all tree types.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Every live node is owned by exactly one parent link (or the tree root);
/// the store itself never links nodes.
#[derive(Debug)]
pub struct NodeStore {
    arena: Arena<Node>,
    limit: Option<usize>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            arena: Arena::new(),
            limit,
        }
    }

    /// Allocates an unlinked leaf. Fails without side effects once the
    /// configured node limit is reached.
    #[instrument(level = "trace", skip(self))]
    pub fn alloc(&mut self, key: Key) -> TreeResult<Index> {
        if let Some(limit) = self.limit {
            if self.arena.len() >= limit {
                return Err(DomainError::CapacityExhausted { limit });
            }
        }
        Ok(self.arena.insert(Node::leaf(key)))
    }

    /// Removes a node from the store. The caller must already have unlinked it.
    pub fn release(&mut self, idx: Index) -> Option<Node> {
        self.arena.remove(idx)
    }

    pub fn get(&self, idx: Index) -> Option<&Node> {
        self.arena.get(idx)
    }

    /// Panics on a stale index: links always point at live nodes.
    #[inline]
    pub fn node(&self, idx: Index) -> &Node {
        &self.arena[idx]
    }

    #[inline]
    pub fn node_mut(&mut self, idx: Index) -> &mut Node {
        &mut self.arena[idx]
    }

    #[inline]
    pub fn height_of(&self, link: Option<Index>) -> u32 {
        link.map_or(0, |idx| self.arena[idx].height)
    }

    /// Recomputes the cached height from the children.
    pub fn refresh_height(&mut self, idx: Index) {
        let node = &self.arena[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.arena[idx].height = height;
    }

    /// Recomputes cached height and balance from the children.
    pub fn refresh(&mut self, idx: Index) {
        let node = &self.arena[idx];
        let (lh, rh) = (self.height_of(node.left), self.height_of(node.right));
        let node = &mut self.arena[idx];
        node.height = 1 + lh.max(rh);
        node.balance = (i64::from(lh) - i64::from(rh)) as i8;
    }

    pub fn leftmost(&self, mut idx: Index) -> Index {
        while let Some(left) = self.arena[idx].left {
            idx = left;
        }
        idx
    }

    pub fn rightmost(&self, mut idx: Index) -> Index {
        while let Some(right) = self.arena[idx].right {
            idx = right;
        }
        idx
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self, root: Option<Index>) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, root)
    }

    /// Releases every node reachable from `root`, children before parents.
    ///
    /// Returns the number of nodes released.
    pub fn drain_postorder(&mut self, root: Option<Index>) -> usize {
        let order: Vec<Index> = self.iter_postorder(root).map(|(idx, _)| idx).collect();
        for &idx in &order {
            self.arena.remove(idx);
        }
        trace!(released = order.len(), "drained subtree");
        order.len()
    }
}

pub struct PostOrderIterator<'a> {
    store: &'a NodeStore,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(store: &'a NodeStore, root: Option<Index>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = root {
            stack.push((root, false));
        }
        Self { store, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.store.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    // Right pushed first so the left subtree is finished first
                    for child in [node.right, node.left].into_iter().flatten() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
