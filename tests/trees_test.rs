//! Baseline trees: plain search tree and perfectly balanced builder

use rstest::rstest;

use rsavl::domain::{
    AvlTree, DomainError, Key, PerfectTree, SearchTree, TreeOptions, TreeView,
};

fn search_tree(keys: &[Key]) -> SearchTree {
    let mut tree = SearchTree::new();
    for &key in keys {
        let _ = tree.insert(key).unwrap();
    }
    tree
}

// ============================================================
// SearchTree
// ============================================================

#[rstest]
#[case::leaf(&[50, 30, 70], 30, &[50, 70])]
#[case::one_child(&[50, 30, 20], 30, &[20, 50])]
#[case::two_children_root(&[50, 30, 70, 60, 80, 65], 50, &[30, 60, 65, 70, 80])]
fn given_search_tree_when_removing_then_order_kept(
    #[case] keys: &[Key],
    #[case] victim: Key,
    #[case] expected: &[Key],
) {
    let mut tree = search_tree(keys);

    assert!(tree.remove(victim).is_removed());

    assert_eq!(tree.keys(), expected);
    assert_eq!(tree.len(), keys.len() - 1);
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn given_two_child_root_when_removing_then_successor_key_promoted() {
    let mut tree = search_tree(&[50, 30, 70, 60, 80, 65]);
    let _ = tree.remove(50);
    let root = tree.store().node(tree.root().unwrap());
    assert_eq!(root.key, 60);
}

#[test]
fn given_recursive_insert_when_same_keys_then_same_tree_as_iterative() {
    let keys = [8, 3, 10, 1, 6, 14, 4, 7, 13, 6];
    let iterative = search_tree(&keys);
    let mut recursive = SearchTree::new();
    for key in keys {
        let _ = recursive.insert_recursive(key).unwrap();
    }
    assert_eq!(
        recursive.to_tree_string().to_string(),
        iterative.to_tree_string().to_string()
    );
}

#[test]
fn given_limit_when_search_tree_full_then_capacity_error() {
    let mut tree = SearchTree::with_limit(Some(1));
    let _ = tree.insert(1).unwrap();
    assert_eq!(
        tree.insert(2).unwrap_err(),
        DomainError::CapacityExhausted { limit: 1 }
    );
    assert_eq!(tree.clear(), 1);
    assert!(tree.is_empty());
}

// ============================================================
// PerfectTree
// ============================================================

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(7, 3)]
#[case(8, 4)]
#[case(100, 7)]
fn given_n_keys_when_building_perfect_tree_then_minimal_height(
    #[case] n: i32,
    #[case] height: u32,
) {
    let tree = PerfectTree::from_keys((1..=n).rev()).unwrap();
    assert_eq!(tree.height(), height);
    assert_eq!(tree.len(), n as usize);
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn given_seven_keys_when_building_perfect_tree_then_all_leaves_at_depth_two() {
    let tree = PerfectTree::from_keys([4, 2, 6, 1, 3, 5, 7, 3]).unwrap();
    let root = tree.store().node(tree.root().unwrap());
    assert_eq!(root.key, 4);
    assert_eq!(tree.average_leaf_depth(), 2.0);
    assert_eq!(tree.leaf_count(), 4);
}

#[test]
fn given_same_keys_when_comparing_kinds_then_avl_between_perfect_and_chain() {
    let keys: Vec<Key> = (1..=31).collect();
    let perfect = PerfectTree::from_keys(keys.iter().copied()).unwrap();
    let avl = AvlTree::from_keys(keys.iter().copied(), TreeOptions::default()).unwrap();
    let chain = search_tree(&keys);

    assert_eq!(perfect.height(), 5);
    assert_eq!(chain.height(), 31);
    assert!(avl.height() >= perfect.height());
    assert!(avl.height() <= 7);
    assert_eq!(avl.checksum(), perfect.checksum());
    assert_eq!(chain.keys(), perfect.keys());
}
