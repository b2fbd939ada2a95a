use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{Node, NodeStore};
use crate::domain::entities::Key;
use crate::domain::stats::{self, Inorder, TreeSummary};

/// Read-only access shared by every tree kind.
///
/// Implementors only expose their store and root; statistics, traversal and
/// rendering come from the provided methods.
pub trait TreeView {
    fn store(&self) -> &NodeStore;

    fn root(&self) -> Option<Index>;

    /// Label used by [`TreeView::to_tree_string`].
    fn label(&self, node: &Node) -> String {
        format!("{}({})", node.key, node.balance)
    }

    fn size(&self) -> usize {
        stats::size(self.store(), self.root())
    }

    fn checksum(&self) -> i64 {
        stats::checksum(self.store(), self.root())
    }

    fn height(&self) -> u32 {
        stats::height(self.store(), self.root())
    }

    fn leaf_count(&self) -> usize {
        stats::leaf_count(self.store(), self.root())
    }

    fn average_leaf_depth(&self) -> f64 {
        stats::average_leaf_depth(self.store(), self.root())
    }

    fn average_node_depth(&self) -> f64 {
        stats::average_node_depth(self.store(), self.root())
    }

    #[instrument(level = "trace", skip(self))]
    fn summary(&self) -> TreeSummary {
        stats::summarize(self.store(), self.root())
    }

    fn inorder(&self) -> Inorder<'_> {
        Inorder::new(self.store(), self.root())
    }

    fn keys(&self) -> Vec<Key> {
        self.inorder().collect()
    }

    /// Renders the tree top-down; a missing sibling shows as `-`.
    fn to_tree_string(&self) -> Tree<String> {
        fn build<V: TreeView + ?Sized>(view: &V, idx: Index) -> Tree<String> {
            let node = view.store().node(idx);
            let mut tree = Tree::new(view.label(node));
            if !node.is_leaf() {
                for child in [node.left, node.right] {
                    tree.push(match child {
                        Some(child) => build(view, child),
                        None => Tree::new("-".to_string()),
                    });
                }
            }
            tree
        }

        match self.root() {
            Some(root) => build(self, root),
            None => Tree::new("(empty)".to_string()),
        }
    }
}
