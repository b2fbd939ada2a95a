//! Rotations: the four rebalancing cases.
//!
//! Two families share the relinking code:
//! - case functions (`rotate_ll` .. `rotate_rl`) set balances by the
//!   balance-factor rules and refresh only cached heights
//! - `rebalance` derives everything from cached heights
//!
//! Both report the case applied; callers log it.
//!
//! Balance convention: height(left) - height(right), left-heavy is +1.

use generational_arena::Index;

use crate::domain::arena::NodeStore;
use crate::domain::entities::Rotation;

/// Result of a rotation at a subtree root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rotated {
    /// New root of the rotated subtree
    pub root: Index,
    pub case: Rotation,
    /// Whether the subtree got one level shorter than before the rotation.
    /// False only for a single rotation over a balanced child (delete path).
    pub shrunk: bool,
}

/// Moves `p.left` up. Returns the new subtree root.
fn link_right(store: &mut NodeStore, p: Index) -> Index {
    let q = store.node(p).left.expect("right rotation needs a left child");
    store.node_mut(p).left = store.node(q).right;
    store.node_mut(q).right = Some(p);
    q
}

/// Moves `p.right` up. Returns the new subtree root.
fn link_left(store: &mut NodeStore, p: Index) -> Index {
    let q = store.node(p).right.expect("left rotation needs a right child");
    store.node_mut(p).right = store.node(q).left;
    store.node_mut(q).left = Some(p);
    q
}

/// Single right rotation for a left-heavy violation at `p`.
pub(crate) fn rotate_ll(store: &mut NodeStore, p: Index) -> Rotated {
    let q = link_right(store, p);
    let shrunk = if store.node(q).balance == 0 {
        store.node_mut(p).balance = 1;
        store.node_mut(q).balance = -1;
        false
    } else {
        store.node_mut(p).balance = 0;
        store.node_mut(q).balance = 0;
        true
    };
    store.refresh_height(p);
    store.refresh_height(q);
    Rotated {
        root: q,
        case: Rotation::LL,
        shrunk,
    }
}

/// Single left rotation for a right-heavy violation at `p`.
pub(crate) fn rotate_rr(store: &mut NodeStore, p: Index) -> Rotated {
    let q = link_left(store, p);
    let shrunk = if store.node(q).balance == 0 {
        store.node_mut(p).balance = -1;
        store.node_mut(q).balance = 1;
        false
    } else {
        store.node_mut(p).balance = 0;
        store.node_mut(q).balance = 0;
        true
    };
    store.refresh_height(p);
    store.refresh_height(q);
    Rotated {
        root: q,
        case: Rotation::RR,
        shrunk,
    }
}

/// Double rotation: `p.left` is right-heavy.
pub(crate) fn rotate_lr(store: &mut NodeStore, p: Index) -> Rotated {
    let q = store.node(p).left.expect("LR rotation needs a left child");
    let r = store.node(q).right.expect("LR rotation needs a left-right grandchild");
    let middle = store.node(r).balance;

    let r_left = store.node(r).left;
    let r_right = store.node(r).right;
    store.node_mut(q).right = r_left;
    store.node_mut(p).left = r_right;
    store.node_mut(r).left = Some(q);
    store.node_mut(r).right = Some(p);

    store.node_mut(p).balance = if middle > 0 { -1 } else { 0 };
    store.node_mut(q).balance = if middle < 0 { 1 } else { 0 };
    store.node_mut(r).balance = 0;
    store.refresh_height(q);
    store.refresh_height(p);
    store.refresh_height(r);
    Rotated {
        root: r,
        case: Rotation::LR,
        shrunk: true,
    }
}

/// Double rotation: `p.right` is left-heavy.
pub(crate) fn rotate_rl(store: &mut NodeStore, p: Index) -> Rotated {
    let q = store.node(p).right.expect("RL rotation needs a right child");
    let r = store.node(q).left.expect("RL rotation needs a right-left grandchild");
    let middle = store.node(r).balance;

    let r_left = store.node(r).left;
    let r_right = store.node(r).right;
    store.node_mut(p).right = r_left;
    store.node_mut(q).left = r_right;
    store.node_mut(r).left = Some(p);
    store.node_mut(r).right = Some(q);

    store.node_mut(p).balance = if middle < 0 { 1 } else { 0 };
    store.node_mut(q).balance = if middle > 0 { -1 } else { 0 };
    store.node_mut(r).balance = 0;
    store.refresh_height(p);
    store.refresh_height(q);
    store.refresh_height(r);
    Rotated {
        root: r,
        case: Rotation::RL,
        shrunk: true,
    }
}

/// Height-driven rebalance of `p` after one of its subtrees changed.
///
/// Refreshes `p` from its children first; rotates only when the refreshed
/// balance leaves [-1, 1]. Returns the subtree root and the case applied.
pub(crate) fn rebalance(store: &mut NodeStore, p: Index) -> (Index, Option<Rotation>) {
    store.refresh(p);
    let balance = store.node(p).balance;

    if balance > 1 {
        let q = store.node(p).left.expect("left-heavy node has a left child");
        let case = if store.node(q).balance < 0 {
            let pivot = rotate_plain_left(store, q);
            store.node_mut(p).left = Some(pivot);
            Rotation::LR
        } else {
            Rotation::LL
        };
        return (rotate_plain_right(store, p), Some(case));
    }
    if balance < -1 {
        let q = store.node(p).right.expect("right-heavy node has a right child");
        let case = if store.node(q).balance > 0 {
            let pivot = rotate_plain_right(store, q);
            store.node_mut(p).right = Some(pivot);
            Rotation::RL
        } else {
            Rotation::RR
        };
        return (rotate_plain_left(store, p), Some(case));
    }
    (p, None)
}

fn rotate_plain_right(store: &mut NodeStore, p: Index) -> Index {
    let q = link_right(store, p);
    store.refresh(p);
    store.refresh(q);
    q
}

fn rotate_plain_left(store: &mut NodeStore, p: Index) -> Index {
    let q = link_left(store, p);
    store.refresh(p);
    store.refresh(q);
    q
}
