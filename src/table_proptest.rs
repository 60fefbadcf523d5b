#![cfg(test)]

// Property tests for BinTable kept inside the crate so the model check
// can run against small directories and odd load factors.

use crate::config::TableConfig;
use crate::table::BinTable;
use hashbrown::HashMap;
use proptest::prelude::*;

// Pool-indexed operations: indices shrink to earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Get(usize),
    Set(usize, i32),
    Remove(usize),
    Contains(Vec<u8>),
    Iterate,
    Release,
}

fn arb_key() -> impl Strategy<Value = Vec<u8>> {
    // small alphabet including zero so embedded NULs and collisions of
    // prefixes show up often
    proptest::collection::vec(prop_oneof![Just(0u8), Just(b'a'), Just(b'b'), any::<u8>()], 0..5)
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<Op>)> {
    proptest::collection::vec(arb_key(), 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Add(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => arb_key().prop_map(Op::Contains),
            1 => Just(Op::Iterate),
            1 => Just(Op::Release),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against a model of value stacks.
// - `add` keeps duplicates; the newest value is what lookups see.
// - `set` replaces the newest value or hands the value back.
// - `remove` pops the newest value and reports absence as `None`.
// - `iter` yields each live entry once; the multiset of keys matches.
// - `len` matches the model and capacity stays a power of two.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(
        (pool, ops) in arb_scenario(),
        initial_capacity in 0usize..8,
        load_factor in prop_oneof![Just(0.5f32), Just(0.75f32), Just(1.0f32), Just(4.0f32)],
    ) {
        let config = TableConfig::new()
            .initial_capacity(initial_capacity)
            .load_factor(load_factor);
        let mut sut: BinTable<i32> = BinTable::with_config(config).unwrap();
        let mut model: HashMap<Vec<u8>, Vec<i32>> = HashMap::new();

        for op in ops {
            match op {
                Op::Add(i, v) => {
                    let before = sut.capacity();
                    sut.add(&pool[i], v).unwrap();
                    model.entry(pool[i].clone()).or_default().push(v);
                    prop_assert!(sut.capacity() >= before);
                }
                Op::Get(i) => {
                    let expected = model.get(&pool[i]).and_then(|s| s.last());
                    prop_assert_eq!(sut.get(&pool[i]), expected);
                }
                Op::Set(i, v) => {
                    let res = sut.set(&pool[i], v);
                    match model.get_mut(&pool[i]).and_then(|s| s.last_mut()) {
                        Some(slot) => {
                            prop_assert_eq!(res, Ok(*slot));
                            *slot = v;
                        }
                        None => {
                            prop_assert_eq!(res, Err(v));
                        }
                    }
                }
                Op::Remove(i) => {
                    let expected = model.get_mut(&pool[i]).and_then(|s| s.pop());
                    prop_assert_eq!(sut.remove(&pool[i]), expected);
                    if model.get(&pool[i]).is_some_and(|s| s.is_empty()) {
                        model.remove(&pool[i]);
                    }
                }
                Op::Contains(key) => {
                    prop_assert_eq!(sut.contains_key(&key), model.contains_key(&key));
                }
                Op::Iterate => {
                    let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
                    let it = sut.iter();
                    prop_assert_eq!(it.len(), sut.len());
                    for (k, _) in it {
                        *seen.entry(k.to_vec()).or_default() += 1;
                    }
                    let expected: HashMap<Vec<u8>, usize> =
                        model.iter().map(|(k, s)| (k.clone(), s.len())).collect();
                    prop_assert_eq!(seen, expected);
                }
                Op::Release => {
                    sut.release();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), 0);
                }
            }

            let model_len: usize = model.values().map(Vec::len).sum();
            prop_assert_eq!(sut.len(), model_len);
            prop_assert_eq!(sut.iter().count(), model_len);
            let cap = sut.capacity();
            prop_assert!(cap == 0 || cap.is_power_of_two());
        }
    }
}

// Property: for every key present before a resize, lookups after the
// resize return the same value.
proptest! {
    #[test]
    fn prop_resize_preserves_lookups(keys in proptest::collection::hash_set(arb_key(), 1..64)) {
        let mut t: BinTable<usize> = BinTable::with_capacity(1).unwrap();
        let keys: Vec<Vec<u8>> = keys.into_iter().collect();
        for (n, key) in keys.iter().enumerate() {
            let cap = t.capacity();
            t.add(key, n).unwrap();
            if t.capacity() != cap {
                for (m, earlier) in keys[..=n].iter().enumerate() {
                    prop_assert_eq!(t.get(earlier), Some(&m));
                }
            }
            prop_assert_eq!(t.iter().count(), n + 1);
        }
    }
}
