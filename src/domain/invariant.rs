//! Structural invariant checks used by debug builds and tests.

use std::collections::HashMap;

use generational_arena::Index;

use crate::domain::arena::NodeStore;
use crate::domain::entities::Key;
use crate::domain::error::InvariantViolation;

/// Strict search order plus reachability of every stored node.
pub fn check_order(store: &NodeStore, root: Option<Index>) -> Result<(), InvariantViolation> {
    check(store, root, false)
}

/// Everything `check_order` covers, plus: cached heights are exact, every
/// balance equals height(left) - height(right) and lies in [-1, 1].
pub fn check_balanced(store: &NodeStore, root: Option<Index>) -> Result<(), InvariantViolation> {
    check(store, root, true)
}

fn check(store: &NodeStore, root: Option<Index>, balanced: bool) -> Result<(), InvariantViolation> {
    let reachable = measure(store, root, balanced)?;
    if reachable != store.len() {
        return Err(InvariantViolation::Detached {
            stored: store.len(),
            reachable,
        });
    }
    Ok(())
}

/// Pending visit of one node with the open key interval it must lie in.
struct Frame {
    idx: Index,
    lower: Option<Key>,
    upper: Option<Key>,
    visited: bool,
}

/// Post-order walk on an explicit stack. Order is checked on the way down,
/// heights and balances on the way up. Returns the number of nodes reached.
fn measure(
    store: &NodeStore,
    root: Option<Index>,
    balanced: bool,
) -> Result<usize, InvariantViolation> {
    let mut heights: HashMap<Index, u32> = HashMap::new();
    let mut stack: Vec<Frame> = root
        .map(|idx| Frame {
            idx,
            lower: None,
            upper: None,
            visited: false,
        })
        .into_iter()
        .collect();
    let mut reachable = 0;

    while let Some(frame) = stack.pop() {
        let node = store.node(frame.idx);

        if !frame.visited {
            reachable += 1;
            let misplaced = frame
                .lower
                .filter(|&lo| node.key <= lo)
                .or_else(|| frame.upper.filter(|&hi| node.key >= hi));
            if let Some(bound) = misplaced {
                return Err(InvariantViolation::Order {
                    key: node.key,
                    neighbour: bound,
                });
            }
            stack.push(Frame {
                visited: true,
                ..frame
            });
            // Right pushed first so the left subtree is finished first
            if let Some(right) = node.right {
                stack.push(Frame {
                    idx: right,
                    lower: Some(node.key),
                    upper: frame.upper,
                    visited: false,
                });
            }
            if let Some(left) = node.left {
                stack.push(Frame {
                    idx: left,
                    lower: frame.lower,
                    upper: Some(node.key),
                    visited: false,
                });
            }
            continue;
        }

        let mut subtree =
            |link: Option<Index>| link.and_then(|c| heights.remove(&c)).unwrap_or(0);
        let lh = subtree(node.left);
        let rh = subtree(node.right);
        let height = 1 + lh.max(rh);
        heights.insert(frame.idx, height);

        if balanced {
            let actual = i64::from(lh) - i64::from(rh);
            if node.height != height {
                return Err(InvariantViolation::HeightMismatch {
                    key: node.key,
                    cached: node.height,
                    actual: height,
                });
            }
            if i64::from(node.balance) != actual {
                return Err(InvariantViolation::BalanceMismatch {
                    key: node.key,
                    recorded: node.balance,
                    actual,
                });
            }
            if !(-1..=1).contains(&node.balance) {
                return Err(InvariantViolation::Unbalanced {
                    key: node.key,
                    balance: node.balance,
                });
            }
        }
    }
    Ok(reachable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_child_on_wrong_side_when_check_order_then_order_violation() {
        let mut store = NodeStore::new();
        let root = store.alloc(10).unwrap();
        let bad = store.alloc(15).unwrap();
        store.node_mut(root).left = Some(bad);

        let err = check_order(&store, Some(root)).unwrap_err();
        assert_eq!(err, InvariantViolation::Order { key: 15, neighbour: 10 });
    }

    #[test]
    fn given_stale_balance_when_check_balanced_then_mismatch() {
        let mut store = NodeStore::new();
        let root = store.alloc(10).unwrap();
        let left = store.alloc(5).unwrap();
        store.node_mut(root).left = Some(left);
        store.refresh_height(root);

        assert!(check_order(&store, Some(root)).is_ok());
        let err = check_balanced(&store, Some(root)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::BalanceMismatch { key: 10, recorded: 0, actual: 1 }
        );
    }

    #[test]
    fn given_unlinked_node_when_check_then_detached() {
        let mut store = NodeStore::new();
        let root = store.alloc(1).unwrap();
        store.alloc(2).unwrap();
        let err = check_order(&store, Some(root)).unwrap_err();
        assert_eq!(err, InvariantViolation::Detached { stored: 2, reachable: 1 });
    }

    #[test]
    fn given_deep_right_chain_when_check_order_then_walks_without_recursion() {
        let mut store = NodeStore::new();
        let root = store.alloc(0).unwrap();
        let mut tail = root;
        for key in 1..200_000 {
            let next = store.alloc(key).unwrap();
            store.node_mut(tail).right = Some(next);
            tail = next;
        }
        assert!(check_order(&store, Some(root)).is_ok());

        store.node_mut(tail).right = Some(store.alloc(-1).unwrap());
        let err = check_order(&store, Some(root)).unwrap_err();
        assert_eq!(err, InvariantViolation::Order { key: -1, neighbour: 199_999 });
    }

    #[test]
    fn given_chain_with_exact_caches_when_check_balanced_then_unbalanced() {
        let mut store = NodeStore::new();
        let root = store.alloc(1).unwrap();
        let mid = store.alloc(2).unwrap();
        let leaf = store.alloc(3).unwrap();
        store.node_mut(root).right = Some(mid);
        store.node_mut(mid).right = Some(leaf);
        store.refresh(mid);
        store.refresh(root);

        let err = check_balanced(&store, Some(root)).unwrap_err();
        assert_eq!(err, InvariantViolation::Unbalanced { key: 1, balance: -2 });
    }
}
