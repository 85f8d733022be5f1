//! Property tests: random distinct key sets against a `BTreeMap` model.

mod common;

use std::collections::{BTreeMap, HashSet};

use blocktree::Error;
use common::{check_invariants, create_tree};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_insert_search_traverse(
        keys in prop::collection::hash_set(any::<u64>(), 0..400),
        probe in any::<u64>(),
    ) {
        let (mut tree, _dir) = create_tree();
        let mut model = BTreeMap::new();

        for &key in &keys {
            let value = key.wrapping_mul(31);
            tree.insert(key, value).unwrap();
            model.insert(key, value);
        }

        for (&key, &value) in &model {
            prop_assert_eq!(tree.search(key).unwrap(), value);
        }
        if !model.contains_key(&probe) {
            prop_assert!(matches!(tree.search(probe), Err(Error::KeyNotFound(_))));
        }

        let expected: Vec<(u64, u64)> = model.into_iter().collect();
        prop_assert_eq!(tree.entries().unwrap(), expected.clone());
        prop_assert_eq!(
            check_invariants(&tree),
            expected.iter().map(|&(k, _)| k).collect::<Vec<_>>()
        );
    }

    #[test]
    fn prop_invariants_hold_after_every_insert(
        keys in prop::collection::vec(any::<u64>(), 0..120),
    ) {
        let (mut tree, _dir) = create_tree();
        let mut model = BTreeMap::new();

        for &key in &keys {
            let result = tree.insert(key, key ^ 0xFF);
            if model.insert(key, key ^ 0xFF).is_none() {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(matches!(result, Err(Error::DuplicateKey(_))));
            }
            prop_assert_eq!(
                check_invariants(&tree),
                model.keys().copied().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn prop_reinsert_is_rejected(
        keys in prop::collection::vec(0u64..500, 1..300),
    ) {
        let (mut tree, _dir) = create_tree();
        let mut seen = HashSet::new();

        for &key in &keys {
            let result = tree.insert(key, key + 1);
            if seen.insert(key) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(matches!(result, Err(Error::DuplicateKey(k)) if k == key));
            }
        }

        prop_assert_eq!(tree.len().unwrap(), seen.len());
        for &key in &seen {
            prop_assert_eq!(tree.search(key).unwrap(), key + 1);
        }
        check_invariants(&tree);
    }
}
