//! End-to-end tests of the B-tree engine against real files.

mod common;

use std::fs;

use blocktree::{BTree, BlockId, Durability, Error, TreeState, BLOCK_SIZE};
use common::{check_invariants, create_tree};
use tempfile::tempdir;

// ============================================================================
// Insert / search
// ============================================================================

#[test]
fn test_insert_and_search() {
    let (mut tree, _dir) = create_tree();

    for key in [50u64, 10, 30, 20, 40] {
        tree.insert(key, key + 1).unwrap();
    }

    for key in [10u64, 20, 30, 40, 50] {
        assert_eq!(tree.search(key).unwrap(), key + 1);
    }
    assert!(matches!(tree.search(25), Err(Error::KeyNotFound(25))));
}

#[test]
fn test_sequential_insert_keeps_invariants() {
    let (mut tree, _dir) = create_tree();

    for key in 1..=1000u64 {
        tree.insert(key, key * 2).unwrap();
    }

    let keys = check_invariants(&tree);
    assert_eq!(keys, (1..=1000).collect::<Vec<_>>());
    assert_eq!(tree.search(777).unwrap(), 1554);
    assert!(tree.height().unwrap() >= 3);
}

#[test]
fn test_strided_insert_keeps_invariants() {
    let (mut tree, _dir) = create_tree();

    // 997 is prime, so this visits every residue exactly once.
    let keys: Vec<u64> = (0..997u64).map(|i| (i * 389) % 997).collect();
    for &key in &keys {
        tree.insert(key, key).unwrap();
    }

    assert_eq!(check_invariants(&tree), (0..997).collect::<Vec<_>>());
}

#[test]
fn test_duplicate_leaves_tree_unchanged() {
    let (mut tree, _dir) = create_tree();
    for key in 1..=100u64 {
        tree.insert(key, key).unwrap();
    }
    let before = tree.entries().unwrap();
    let header_before = tree.header().unwrap();

    assert!(matches!(tree.insert(42, 0), Err(Error::DuplicateKey(42))));

    assert_eq!(tree.entries().unwrap(), before);
    assert_eq!(tree.header().unwrap(), header_before);
}

#[test]
fn test_extreme_keys() {
    let (mut tree, _dir) = create_tree();
    tree.insert(u64::MAX, 1).unwrap();
    tree.insert(0, 2).unwrap();

    assert_eq!(tree.entries().unwrap(), vec![(0, 2), (u64::MAX, 1)]);
}

// ============================================================================
// Persistence and file format
// ============================================================================

#[test]
fn test_reopen_preserves_tree() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("persist.idx");

    let header = {
        let mut tree = BTree::with_durability(Durability::Buffered);
        tree.create(&path, false).unwrap();
        for key in (1..=300u64).rev() {
            tree.insert(key, key * 7).unwrap();
        }
        let header = tree.header().unwrap();
        tree.close();
        header
    };

    let mut tree = BTree::new();
    tree.open(&path).unwrap();

    assert_eq!(tree.state(), TreeState::NonEmpty);
    assert_eq!(tree.header().unwrap(), header);
    for key in 1..=300u64 {
        assert_eq!(tree.search(key).unwrap(), key * 7);
    }
    check_invariants(&tree);
}

#[test]
fn test_blocks_are_never_reused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("alloc.idx");

    let mut tree = BTree::with_durability(Durability::Buffered);
    tree.create(&path, false).unwrap();
    for key in 1..=500u64 {
        tree.insert(key, key).unwrap();
    }
    let next = tree.header().unwrap().next_block_id;
    tree.close();

    // Blocks 0..next are all written, nothing beyond.
    let len = fs::metadata(&path).unwrap().len();
    assert_eq!(len, next.0 * BLOCK_SIZE as u64);
}

#[test]
fn test_header_bytes_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.idx");

    let mut tree = BTree::new();
    tree.create(&path, false).unwrap();
    tree.close();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), BLOCK_SIZE);
    assert_eq!(&bytes[..8], b"4337PRJ3");
    assert_eq!(&bytes[8..16], &0u64.to_be_bytes());
    assert_eq!(&bytes[16..24], &1u64.to_be_bytes());
    assert!(bytes[24..].iter().all(|&b| b == 0));
}

#[test]
fn test_open_missing_file() {
    let dir = tempdir().unwrap();
    let mut tree = BTree::new();

    let err = tree.open(dir.path().join("missing.idx")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert!(err.is_not_found());
    assert_eq!(tree.state(), TreeState::Closed);
}

#[test]
fn test_open_rejects_foreign_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "just some text, not an index").unwrap();

    let mut tree = BTree::new();
    assert!(matches!(tree.open(&path), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_create_refuses_existing_without_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exists.idx");

    let mut tree = BTree::with_durability(Durability::Buffered);
    tree.create(&path, false).unwrap();
    tree.insert(1, 1).unwrap();
    tree.close();

    let mut other = BTree::new();
    assert!(matches!(
        other.create(&path, false),
        Err(Error::AlreadyExists(_))
    ));

    // The refused create must not have touched the file.
    other.open(&path).unwrap();
    assert_eq!(other.search(1).unwrap(), 1);

    other.create(&path, true).unwrap();
    assert_eq!(other.state(), TreeState::Empty);
    assert!(matches!(other.search(1), Err(Error::KeyNotFound(1))));
}

// ============================================================================
// Extract / load
// ============================================================================

#[test]
fn test_extract_ascending() {
    let (mut tree, dir) = create_tree();
    tree.insert(5, 50).unwrap();
    tree.insert(1, 10).unwrap();
    tree.insert(3, 30).unwrap();

    let out = dir.path().join("out.csv");
    assert_eq!(tree.extract(&out).unwrap(), 3);

    assert_eq!(fs::read_to_string(&out).unwrap(), "1,10\n3,30\n5,50\n");
}

#[test]
fn test_extract_empty_tree() {
    let (tree, dir) = create_tree();
    let out = dir.path().join("empty.csv");

    assert_eq!(tree.extract(&out).unwrap(), 0);
    assert_eq!(fs::read_to_string(&out).unwrap(), "");
}

#[test]
fn test_load_skips_duplicates() {
    let (mut tree, dir) = create_tree();
    tree.insert(2, 200).unwrap();

    let input = dir.path().join("in.csv");
    fs::write(&input, "1,10\n2,999\n3,30\n").unwrap();

    let report = tree.load(&input).unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, vec![2]);
    assert_eq!(tree.search(2).unwrap(), 200);
    assert_eq!(tree.entries().unwrap(), vec![(1, 10), (2, 200), (3, 30)]);
}

#[test]
fn test_load_aborts_on_malformed_line() {
    let (mut tree, dir) = create_tree();

    let input = dir.path().join("bad.csv");
    fs::write(&input, "1,10\n2,20\nthree,30\n4,40\n").unwrap();

    match tree.load(&input) {
        Err(Error::MalformedInput { line, content }) => {
            assert_eq!(line, 3);
            assert_eq!(content, "three,30");
        }
        other => panic!("Expected MalformedInput, got {:?}", other),
    }

    // Lines before the bad one stay inserted.
    assert_eq!(tree.entries().unwrap(), vec![(1, 10), (2, 20)]);
}

#[test]
fn test_load_missing_input() {
    let (mut tree, dir) = create_tree();
    assert!(matches!(
        tree.load(dir.path().join("nope.csv")),
        Err(Error::FileNotFound(_))
    ));
}

#[test]
fn test_extract_then_load_into_new_file() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("dump.csv");

    let mut source = BTree::with_durability(Durability::Buffered);
    source.create(dir.path().join("a.idx"), false).unwrap();
    for key in (0..250u64).map(|i| (i * 37) % 250) {
        source.insert(key, key * 3).unwrap();
    }
    source.extract(&csv).unwrap();

    let mut target = BTree::with_durability(Durability::Buffered);
    target.create(dir.path().join("b.idx"), false).unwrap();
    let report = target.load(&csv).unwrap();

    assert_eq!(report.inserted, 250);
    assert!(report.skipped.is_empty());
    assert_eq!(target.entries().unwrap(), source.entries().unwrap());
    check_invariants(&target);
}

// ============================================================================
// Cache interaction
// ============================================================================

#[test]
fn test_repeated_search_hits_cache() {
    let (mut tree, _dir) = create_tree();
    for key in 1..=19u64 {
        tree.insert(key, key).unwrap();
    }
    let before = tree.cache_stats().unwrap();

    for _ in 0..10 {
        tree.search(7).unwrap();
    }

    let after = tree.cache_stats().unwrap();
    assert_eq!(after.hits - before.hits, 10);
    assert_eq!(after.misses, before.misses);
}

#[test]
fn test_root_allocation_order() {
    let (mut tree, _dir) = create_tree();
    for key in 1..=20u64 {
        tree.insert(key, key).unwrap();
    }

    // 1: first root leaf, 2: new root, 3: right sibling.
    let header = tree.header().unwrap();
    assert_eq!(header.root_id, BlockId::new(2));
    assert_eq!(header.next_block_id, BlockId::new(4));
    let root = tree.node(header.root_id).unwrap();
    assert_eq!(root.children(), &[BlockId::new(1), BlockId::new(3)]);
}
