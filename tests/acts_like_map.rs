//! In these tests, we make sure the SafeMap works as a HashMap in single threaded context, and
//! sometimes in multithreaded too.
//!
//! To do that we simply generate a series of inserts, lookups, get-or-inserts and deletions and
//! try them on both maps. They need to return the same things, and at the end a snapshot of the
//! SafeMap must be equal to the model map.
//!
//! Furthermore, each test is run in several instances, with keys in differently sized universe.
//! The small ones are more likely to reuse the same key and exercise the overwrite and
//! already-present paths.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use proptest::collection::vec;
use proptest::prelude::*;
use rayon::prelude::*;
use safemap::SafeMap;

#[derive(Debug, Clone)]
enum Instruction<K, V> {
    Lookup(K),
    Remove(K),
    Insert(K, V),
    GetOrInsert(K, V),
    Len,
    Clear,
}

impl<K, V> Instruction<K, V>
where
    K: Arbitrary + Clone + Debug + Eq + Hash + 'static,
    V: Arbitrary + Clone + Debug + PartialEq + 'static,
{
    fn strategy() -> impl Strategy<Value = Self> {
        use Instruction::*;

        prop_oneof![
            4 => any::<K>().prop_map(Lookup),
            4 => any::<K>().prop_map(Remove),
            4 => any::<(K, V)>().prop_map(|(k, v)| Insert(k, v)),
            4 => any::<(K, V)>().prop_map(|(k, v)| GetOrInsert(k, v)),
            2 => Just(Len),
            1 => Just(Clear),
        ]
    }

    fn run(instructions: Vec<Self>) -> Result<(), TestCaseError> {
        use Instruction::*;

        let safe = SafeMap::new();
        let mut model = HashMap::new();
        for ins in instructions {
            match ins {
                Lookup(key) => {
                    let expected = model.get(&key).cloned();
                    let found = safe.get(&key);
                    prop_assert_eq!(expected, found);
                }
                Remove(key) => {
                    let expected = model.remove(&key);
                    let found = safe.remove(&key);
                    prop_assert_eq!(expected, found);
                }
                Insert(key, value) => {
                    let expected = model.insert(key.clone(), value.clone());
                    let found = safe.insert(key, value);
                    prop_assert_eq!(expected, found);
                }
                GetOrInsert(key, value) => {
                    let was_there = model.contains_key(&key);
                    let expected = model
                        .entry(key.clone())
                        .or_insert_with(|| value.clone())
                        .clone();
                    let found = safe.get_or_insert(key, value);
                    prop_assert_eq!(was_there, !found.is_created());
                    prop_assert_eq!(expected, found.into_inner());
                }
                Len => {
                    prop_assert_eq!(model.len(), safe.len());
                }
                Clear => {
                    model.clear();
                    safe.clear();
                    prop_assert!(safe.is_empty());
                }
            }
        }

        let snapshot = safe.iter().collect::<HashMap<_, _>>();
        prop_assert_eq!(model, snapshot);

        Ok(())
    }
}

fn insert_parallel_test<T: Clone + Hash + Eq + Send + Sync>(
    values: Vec<T>,
) -> Result<(), TestCaseError> {
    let set: HashSet<_> = values.iter().cloned().collect();
    let map = SafeMap::new();
    values.into_par_iter().for_each(|v| {
        map.insert(v, ());
    });
    prop_assert_eq!(set.len(), map.len());
    for v in set {
        prop_assert!(map.get(&v).is_some());
    }

    Ok(())
}

proptest! {
    #[test]
    fn small_keys(instructions in vec(Instruction::<u8, usize>::strategy(), 1..10_000)) {
        Instruction::run(instructions)?;
    }

    #[test]
    fn mid_keys(instructions in vec(Instruction::<u16, usize>::strategy(), 1..10_000)) {
        Instruction::run(instructions)?;
    }

    #[test]
    fn large_keys(instructions in vec(Instruction::<usize, usize>::strategy(), 1..10_000)) {
        Instruction::run(instructions)?;
    }

    #[test]
    fn string_keys(instructions in vec(Instruction::<String, usize>::strategy(), 1..100)) {
        Instruction::run(instructions)?;
    }

    #[test]
    fn insert_all_large(values in vec(any::<usize>(), 1..10_000)) {
        // Make them unique
        let set: HashSet<_> = values.iter().cloned().collect();
        let map = SafeMap::new();
        for v in values {
            map.insert(v, ());
        }
        prop_assert_eq!(set.len(), map.len());
        for v in set {
            prop_assert!(map.get(&v).is_some());
        }
    }

    #[test]
    fn insert_all_small_parallel(values in vec(any::<u8>(), 1..10_000)) {
        insert_parallel_test(values)?;
    }

    #[test]
    fn insert_all_mid_parallel(values in vec(any::<u16>(), 1..10_000)) {
        insert_parallel_test(values)?;
    }

    #[test]
    fn insert_all_large_parallel(values in vec(any::<usize>(), 1..10_000)) {
        insert_parallel_test(values)?;
    }
}
