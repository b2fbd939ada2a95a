//! Domain layer: the tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod avl;
pub mod entities;
pub mod error;
pub mod invariant;
pub mod perfect;
mod rotation;
pub mod search;
pub mod stats;
pub mod view;

pub use arena::{Node, NodeStore};
pub use avl::AvlTree;
pub use entities::*;
pub use error::{DomainError, InvariantViolation, TreeResult};
pub use perfect::PerfectTree;
pub use search::SearchTree;
pub use stats::{Inorder, TreeSummary};
pub use view::TreeView;
