//! Helpers shared by the integration tests.

#![allow(dead_code)]

use blocktree::{BTree, BlockId, Durability, MAX_CHILDREN, MAX_KEYS};
use tempfile::TempDir;

pub const MIN_KEYS: usize = blocktree::DEGREE - 1;

/// Create an open, empty tree in a fresh temporary directory.
pub fn create_tree() -> (BTree, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = BTree::with_durability(Durability::Buffered);
    tree.create(dir.path().join("test.idx"), false).unwrap();
    (tree, dir)
}

/// Walk the whole tree and assert every structural invariant.
///
/// Returns the keys in traversal order.
pub fn check_invariants(tree: &BTree) -> Vec<u64> {
    let header = tree.header().unwrap();
    let mut keys = Vec::new();
    if header.root_id.is_none() {
        return keys;
    }

    let mut leaf_depth = None;
    check_node(tree, header.root_id, true, None, None, 0, &mut leaf_depth, &mut keys);
    keys
}

#[allow(clippy::too_many_arguments)]
fn check_node(
    tree: &BTree,
    id: BlockId,
    is_root: bool,
    lower: Option<u64>,
    upper: Option<u64>,
    depth: usize,
    leaf_depth: &mut Option<usize>,
    keys: &mut Vec<u64>,
) {
    let node = tree.node(id).unwrap();
    let n = node.num_keys;

    assert_eq!(node.block_id, id, "node stored in the wrong block");
    assert!(n <= MAX_KEYS, "{} holds {} keys", id, n);
    if !is_root {
        assert!(n >= MIN_KEYS, "{} holds only {} keys", id, n);
    }
    assert!(
        node.keys().windows(2).all(|w| w[0] < w[1]),
        "{} keys not strictly ascending: {:?}",
        id,
        node.keys()
    );
    for &key in node.keys() {
        assert!(lower.map_or(true, |lo| key > lo), "{} out of range in {}", key, id);
        assert!(upper.map_or(true, |hi| key < hi), "{} out of range in {}", key, id);
    }

    if node.is_leaf() {
        assert!(node.children.iter().all(|c| c.is_none()));
        match leaf_depth {
            Some(d) => assert_eq!(*d, depth, "leaves at different depths"),
            None => *leaf_depth = Some(depth),
        }
        keys.extend_from_slice(node.keys());
        return;
    }

    assert!(node.children[..=n].iter().all(|c| !c.is_none()));
    assert!(node.children[n + 1..MAX_CHILDREN].iter().all(|c| c.is_none()));

    for i in 0..=n {
        let lo = if i == 0 { lower } else { Some(node.keys[i - 1]) };
        let hi = if i == n { upper } else { Some(node.keys[i]) };
        check_node(tree, node.children[i], false, lo, hi, depth + 1, leaf_depth, keys);
        if i < n {
            keys.push(node.keys[i]);
        }
    }
}
