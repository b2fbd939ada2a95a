//! Insert/delete scenarios for the AVL tree under both balancing strategies

use rstest::{fixture, rstest};

use rsavl::domain::{
    AvlTree, BalanceStrategy, DomainError, InsertOutcome, Key, Node, RemoveOutcome, TreeOptions,
    TreeView,
};
use rsavl::util::testing;

fn tree_with(strategy: BalanceStrategy, keys: &[Key]) -> AvlTree {
    testing::init_test_setup();
    let options = TreeOptions {
        strategy,
        ..TreeOptions::default()
    };
    AvlTree::from_keys(keys.iter().copied(), options).expect("build tree")
}

fn root(tree: &AvlTree) -> &Node {
    tree.store().node(tree.root().expect("non-empty tree"))
}

fn left(tree: &AvlTree, node: &Node) -> Key {
    tree.store().node(node.left.expect("left child")).key
}

fn right(tree: &AvlTree, node: &Node) -> Key {
    tree.store().node(node.right.expect("right child")).key
}

#[fixture]
fn seven() -> Vec<Key> {
    vec![50, 30, 70, 20, 40, 60, 80]
}

// ============================================================
// Insertion
// ============================================================

#[rstest]
fn given_level_order_keys_when_inserting_then_tree_is_full(
    seven: Vec<Key>,
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let tree = tree_with(strategy, &seven);

    assert_eq!(tree.height(), 3);
    assert_eq!(tree.size(), 7);
    assert_eq!(tree.checksum(), 350);
    assert_eq!(tree.keys(), vec![20, 30, 40, 50, 60, 70, 80]);
    assert_eq!(root(&tree).key, 50);
    assert!(tree.check_invariants().is_ok());
}

#[rstest]
#[case::rr(&[10, 20, 30])]
#[case::ll(&[30, 20, 10])]
#[case::lr(&[30, 10, 20])]
#[case::rl(&[10, 30, 20])]
fn given_three_keys_when_inserting_then_rotation_centers_middle_key(
    #[case] keys: &[Key],
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let tree = tree_with(strategy, keys);
    let top = root(&tree);

    assert_eq!(top.key, 20);
    assert_eq!(left(&tree, top), 10);
    assert_eq!(right(&tree, top), 30);
    assert_eq!(tree.keys(), vec![10, 20, 30]);
    let balances: Vec<i8> = tree
        .store()
        .iter_postorder(tree.root())
        .map(|(_, node)| node.balance)
        .collect();
    assert_eq!(balances, vec![0, 0, 0]);
}

#[rstest]
fn given_existing_key_when_inserting_then_duplicate_and_unchanged(
    seven: Vec<Key>,
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = tree_with(strategy, &seven);
    let before = tree.to_tree_string().to_string();

    assert_eq!(tree.insert(40).unwrap(), InsertOutcome::Duplicate);
    assert_eq!(tree.size(), 7);
    assert_eq!(tree.to_tree_string().to_string(), before);
}

#[rstest]
fn given_full_store_when_inserting_then_capacity_error_and_unchanged(
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = AvlTree::with_options(TreeOptions {
        strategy,
        node_limit: Some(3),
        verify: true,
    });
    for key in [10, 20, 30] {
        assert!(tree.insert(key).unwrap().is_inserted());
    }
    let before = tree.to_tree_string().to_string();

    let err = tree.insert(40).unwrap_err();

    assert_eq!(err, DomainError::CapacityExhausted { limit: 3 });
    assert_eq!(tree.to_tree_string().to_string(), before);
    assert!(!tree.contains(40));
    assert!(tree.check_invariants().is_ok());
    // an existing key is still reported as duplicate, not as an error
    assert_eq!(tree.insert(20).unwrap(), InsertOutcome::Duplicate);
}

// ============================================================
// Deletion
// ============================================================

#[rstest]
fn given_two_child_root_when_removing_then_successor_takes_its_place(
    seven: Vec<Key>,
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = tree_with(strategy, &seven);

    assert_eq!(tree.remove(50), RemoveOutcome::Removed);

    assert_eq!(root(&tree).key, 60);
    assert_eq!(tree.size(), 6);
    assert!(!tree.contains(50));
    assert_eq!(tree.keys(), vec![20, 30, 40, 60, 70, 80]);
    assert!(tree.check_invariants().is_ok());
}

#[rstest]
fn given_right_heavy_root_when_removing_left_leaf_then_rr_rotation(
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = tree_with(strategy, &[20, 10, 30, 40]);

    assert!(tree.remove(10).is_removed());

    let top = root(&tree);
    assert_eq!(top.key, 30);
    assert_eq!(left(&tree, top), 20);
    assert_eq!(right(&tree, top), 40);
    assert_eq!(tree.height(), 2);
}

#[rstest]
fn given_inner_heavy_sibling_when_removing_then_rl_rotation(
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = tree_with(strategy, &[20, 10, 30, 25]);

    assert!(tree.remove(10).is_removed());

    let top = root(&tree);
    assert_eq!(top.key, 25);
    assert_eq!(left(&tree, top), 20);
    assert_eq!(right(&tree, top), 30);
    assert!(tree.check_invariants().is_ok());
}

#[rstest]
fn given_missing_key_when_removing_then_absent_and_unchanged(
    seven: Vec<Key>,
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = tree_with(strategy, &seven);
    let before = tree.to_tree_string().to_string();

    assert_eq!(tree.remove(55), RemoveOutcome::Absent);
    assert_eq!(tree.to_tree_string().to_string(), before);
    assert_eq!(AvlTree::new().remove(1), RemoveOutcome::Absent);
}

#[rstest]
fn given_tree_when_removing_every_key_then_empty(
    seven: Vec<Key>,
    #[values(BalanceStrategy::BalanceFactor, BalanceStrategy::Height)] strategy: BalanceStrategy,
) {
    let mut tree = tree_with(strategy, &seven);
    for key in seven.iter().rev() {
        assert!(tree.remove(*key).is_removed());
        assert!(tree.check_invariants().is_ok());
    }

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.average_leaf_depth(), 0.0);
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn given_small_tree_when_rendering_then_shows_keys_with_balances() {
    let tree = tree_with(BalanceStrategy::BalanceFactor, &[20, 10, 30, 5]);
    let text = tree.to_tree_string().to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "20(1)");
    assert!(lines[1].ends_with("10(1)"));
    assert!(lines[2].ends_with("5(0)"));
    assert!(lines[3].ends_with('-'));
    assert!(lines[4].ends_with("30(0)"));
    assert_eq!(AvlTree::new().to_tree_string().to_string().trim(), "(empty)");
}
