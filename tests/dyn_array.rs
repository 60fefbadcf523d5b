// DynArray and SlotArray behavior through the public API.
use bintable::{growth, AllocError, DynArray, SlotArray};

// Test: C pushes fill exactly; push C+1 grows and lands at index C.
#[test]
fn growth_at_capacity_boundary() {
    for c in [1usize, 2, 3, 4, 7, 16] {
        let mut a: DynArray<usize> = DynArray::with_capacity(c).unwrap();
        for i in 0..c {
            a.push(i).unwrap();
        }
        assert_eq!((a.len(), a.capacity()), (c, c));
        a.push(c).unwrap();
        assert!(a.capacity() > c);
        assert_eq!(a.capacity(), growth::grow(c).unwrap());
        assert_eq!(a[c], c);
    }
}

// Test: the integer-list use: per-host worker lists grown from 4.
#[test]
fn host_worker_lists() {
    let hosts = 3;
    let mut lists: Vec<DynArray<i32>> = (0..hosts)
        .map(|_| DynArray::with_capacity(4).unwrap())
        .collect();
    for rank in 0..20 {
        lists[(rank % hosts as i32) as usize].push(rank).unwrap();
    }
    assert_eq!(lists[0].as_slice(), &[0, 3, 6, 9, 12, 15, 18]);
    assert_eq!(lists[0].capacity(), 8);
    for l in lists.iter_mut() {
        l.release();
    }
    assert!(lists.iter().all(|l| !l.has_storage()));
}

// Test: pop at zero is a no-op, repeatedly.
#[test]
fn removal_floor() {
    let mut a: DynArray<u8> = DynArray::new();
    assert_eq!(a.pop(), None);
    a.push(1).unwrap();
    a.push(2).unwrap();
    assert_eq!(a.pop(), Some(2));
    assert_eq!(a.pop(), Some(1));
    for _ in 0..5 {
        assert_eq!(a.pop(), None);
    }
    assert_eq!(a.len(), 0);
    assert_eq!(a.capacity(), 2);
}

// Test: clear vs release.
#[test]
fn clear_then_release() {
    let mut a: DynArray<String> = DynArray::with_capacity(4).unwrap();
    a.push("x".to_string()).unwrap();
    a.clear();
    assert_eq!((a.len(), a.capacity(), a.has_storage()), (0, 4, true));
    a.push("y".to_string()).unwrap();
    assert_eq!(a[0], "y");
    a.release();
    assert_eq!((a.len(), a.capacity(), a.has_storage()), (0, 0, false));
    a.release();
    assert_eq!((a.len(), a.capacity(), a.has_storage()), (0, 0, false));
}

// Test: a failed init reports the error; a failed expand keeps state.
#[test]
fn allocation_failures_are_clean() {
    assert!(matches!(
        DynArray::<u32>::with_capacity(usize::MAX),
        Err(AllocError::Reserve(_))
    ));
    let mut a: DynArray<u32> = DynArray::with_capacity(1).unwrap();
    a.push(5).unwrap();
    assert!(a.expand(usize::MAX / 2).is_err());
    assert_eq!((a.len(), a.capacity()), (1, 1));
    assert_eq!(a[0], 5);
}

// Test: iteration through the slice view and by value.
#[test]
fn iteration_views() {
    let mut a = DynArray::new();
    for i in 1..=4 {
        a.push(i).unwrap();
    }
    for v in &mut a {
        *v *= 10;
    }
    assert_eq!((&a).into_iter().sum::<i32>(), 100);
    let owned: Vec<i32> = a.into_iter().collect();
    assert_eq!(owned, vec![10, 20, 30, 40]);
}

// Test: a slot array as a work-unit store: indices stable, reused.
#[test]
fn slot_array_work_units() {
    let mut units: SlotArray<String> = SlotArray::with_capacity(2).unwrap();
    let a = units.insert("a".into()).unwrap();
    let b = units.insert("b".into()).unwrap();
    let c = units.insert("c".into()).unwrap();
    assert_eq!((a, b, c), (0, 1, 2));
    assert_eq!(units.capacity(), 4);

    assert_eq!(units.remove(b).as_deref(), Some("b"));
    assert_eq!(units.get(b), None);
    assert_eq!(units.get(c).map(String::as_str), Some("c"));
    let d = units.insert("d".into()).unwrap();
    assert_eq!(d, b);
    assert_eq!(units.len(), 3);

    let live: Vec<usize> = units.iter().map(|(i, _)| i).collect();
    assert_eq!(live, vec![0, 1, 2]);
}
