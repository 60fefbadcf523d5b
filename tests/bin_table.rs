// BinTable end-to-end scenarios.
//
// Each test states the behavior it checks. The invariants exercised:
// - Visibility: a scan right after each insert sees exactly the number
//   of successful inserts so far, resizes included.
// - Membership: lookups and removals in an order unrelated to insertion
//   find every entry with its value.
// - Collisions: many duplicates in a tiny directory stay correct.
// - Binary keys: length is authoritative, zero bytes count.
use bintable::{AllocError, BinTable, TableConfig};
use std::collections::hash_map::RandomState;

// Key bytes of "key{n}" without any terminator.
fn make_key(n: usize) -> Vec<u8> {
    format!("key{}", n).into_bytes()
}

// Test: scan count tracks insert count through several resizes.
// Verifies: counts 1..=16 in lockstep for a table started at 4 buckets.
#[test]
fn scan_count_follows_inserts_across_resize() {
    let mut t = BinTable::with_capacity(4).expect("init");
    let start = t.capacity();
    for i in 0..16 {
        t.add(&make_key(i), i).expect("add");
        assert_eq!(t.iter().count(), i + 1, "after inserting key{}", i);
    }
    assert!(t.capacity() > start, "at least one resize happened");
    assert_eq!(t.len(), 16);
}

// Test: the full driver: 64 inserts from 4 buckets, lookups and removals
// in permuted orders.
// Verifies: every lookup returns its value; table ends empty.
#[test]
fn permuted_lookup_and_removal() {
    const N: usize = 64;
    let mut t = BinTable::with_capacity(4).expect("init");
    for i in 0..N {
        t.add(&make_key(i), i).expect("add");
        assert_eq!(t.iter().count(), i + 1);
    }
    assert_eq!(t.len(), N);

    for i in 0..N {
        let j = (i * 29 + 30) % N;
        assert_eq!(t.get(&make_key(j)), Some(&j), "search key{}", j);
    }
    assert_eq!(t.len(), N);

    for i in 0..N {
        let j = (i * 29 + 5) % N;
        assert_eq!(t.remove(&make_key(j)), Some(j), "remove key{}", j);
    }
    assert_eq!(t.len(), 0);
    assert_eq!(t.iter().count(), 0);

    let mut visited = 0;
    t.release_with(|_, _| visited += 1);
    assert_eq!(visited, 0);
    assert_eq!(t.capacity(), 0);
}

// Test: a 2-bucket table with a huge load factor never resizes; 128 adds
// of 16 distinct keys stack duplicates in long chains.
// Verifies: each add is immediately visible; len counts duplicates.
#[test]
fn forced_collisions_with_duplicates() {
    const N: usize = 128;
    let config = TableConfig::new().initial_capacity(2).load_factor(1000.0);
    let mut t = BinTable::with_config(config).expect("init");
    for i in 0..N {
        let j = (i * 9 + 12) % 16;
        t.add(&make_key(j), j).expect("add");
        assert_eq!(t.get(&make_key(j)), Some(&j));
    }
    assert_eq!(t.len(), N);
    assert_eq!(t.capacity(), 2);

    // each key appears N / 16 times in the dump
    let dump = t.keys_hex(0, None);
    assert_eq!(dump.split(' ').filter(|s| !s.is_empty()).count(), N);
    assert!(dump.contains("6b657930 ")); // "key0"

    let mut freed = Vec::new();
    t.release_with(|k, v| freed.push((k.to_vec(), v)));
    assert_eq!(freed.len(), N);
    assert!(freed.iter().all(|(k, v)| *k == make_key(*v)));
}

// Test: a key with an embedded zero is stored under its full length.
// Verifies: the prefix before the zero is a different key.
#[test]
fn embedded_zero_uses_declared_length() {
    let mut t = BinTable::with_capacity(8).expect("init");
    let full: &[u8] = b"abc\0def";
    t.add(full, "full").expect("add");
    assert_eq!(t.get(full), Some(&"full"));
    assert_eq!(t.get(b"abc"), None);
    t.add(b"abc", "prefix").expect("add");
    assert_eq!(t.get(full), Some(&"full"));
    assert_eq!(t.get(b"abc"), Some(&"prefix"));
    let (k, _) = t.iter().find(|(_, v)| **v == "full").expect("scan");
    assert_eq!(k.len(), 7);
}

// Test: round trip for every key length from 0 to 32.
#[test]
fn roundtrip_all_lengths() {
    let mut t = BinTable::with_capacity(1).expect("init");
    let keys: Vec<Vec<u8>> = (0..=32u8).map(|n| (0..n).collect()).collect();
    for (i, k) in keys.iter().enumerate() {
        t.add(k, i).expect("add");
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.get(k), Some(&i));
    }
}

// Test: a caller-supplied hasher drives bucket selection.
#[test]
fn custom_hasher() {
    let mut t: BinTable<u32, RandomState> =
        BinTable::with_hasher(RandomState::new()).expect("init");
    for i in 0..100u32 {
        t.add(&i.to_be_bytes(), i).expect("add");
    }
    for i in 0..100u32 {
        assert_eq!(t.get(&i.to_be_bytes()), Some(&i));
    }
}

// Test: an impossible directory is reported, not aborted on.
#[test]
fn init_failure_is_reported() {
    let r = BinTable::<()>::with_capacity(usize::MAX);
    assert!(matches!(r, Err(AllocError::CapacityOverflow { .. })));
}

// Test: values are opaque: the table drops owned values exactly once.
#[test]
fn values_dropped_once() {
    use std::rc::Rc;
    let token = Rc::new(());
    {
        let mut t = BinTable::with_capacity(2).expect("init");
        for i in 0..10u8 {
            t.add(&[i], Rc::clone(&token)).expect("add");
        }
        assert_eq!(Rc::strong_count(&token), 11);
        drop(t.remove(&[3]));
        assert_eq!(Rc::strong_count(&token), 10);
    }
    assert_eq!(Rc::strong_count(&token), 1);
}
