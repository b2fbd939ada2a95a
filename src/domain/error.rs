//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::Key;

/// Domain errors represent failures of tree operations.
/// Duplicate inserts and absent deletes are outcomes, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node store exhausted: limit of {limit} nodes reached")]
    CapacityExhausted { limit: usize },

    #[error("invalid key range [{min}, {max}] for {count} unique keys")]
    InvalidKeyRange { min: Key, max: Key, count: usize },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Structural defect found by the invariant checker.
///
/// Any of these after a completed insert or remove is a bug in the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("order violated at key {key}: {neighbour} is on the wrong side")]
    Order { key: Key, neighbour: Key },

    #[error("node {key} is out of balance: {balance}")]
    Unbalanced { key: Key, balance: i8 },

    #[error("node {key} records balance {recorded} but subtrees differ by {actual}")]
    BalanceMismatch { key: Key, recorded: i8, actual: i64 },

    #[error("node {key} caches height {cached} but measures {actual}")]
    HeightMismatch { key: Key, cached: u32, actual: u32 },

    #[error("store holds {stored} nodes but the tree reaches {reachable}")]
    Detached { stored: usize, reachable: usize },
}
