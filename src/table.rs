//! BinTable: chained hash table keyed by raw byte strings.
//!
//! Layout
//! - `directory`: a `DynArray` of chain heads, length always a power of
//!   two (or zero after `release`). A bucket is `None` when empty.
//! - `entries`: arena of entries addressed by generational `EntryKey`s.
//!   Chains link through `Entry::next`, so a rehash only rewrites links
//!   and the directory; entries never move.
//!
//! Keys are copied on insert and compared byte-for-byte over their full
//! length. Each entry keeps the 64-bit hash computed at insert time, and
//! every later bucket selection uses that stored hash.
//!
//! Duplicate keys coexist. New entries are linked at the head of their
//! chain and a rehash keeps chain order, so the newest entry for a key
//! is the one `get`, `set` and `remove` see.

use crate::config::TableConfig;
use crate::dyn_array::DynArray;
use crate::error::AllocError;
use crate::growth;
use core::fmt::{self, Write as _};
use core::hash::{BuildHasher, Hasher};
use core::iter::FusedIterator;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::SlotMap;

slotmap::new_key_type! {
    struct EntryKey;
}

#[derive(Debug)]
struct Entry<V> {
    key: Box<[u8]>,
    value: V,
    hash: u64,
    next: Option<EntryKey>,
}

pub struct BinTable<V, S = DefaultHashBuilder> {
    hasher: S,
    directory: DynArray<Option<EntryKey>>,
    entries: SlotMap<EntryKey, Entry<V>>,
    load_factor: f32,
    // grow before linking a new entry once len exceeds this
    threshold: usize,
}

impl<V> BinTable<V> {
    /// A table with `DEFAULT_CAPACITY` buckets.
    ///
    /// # Panics
    /// If the directory cannot be allocated, like `Vec::with_capacity`.
    pub fn new() -> Self {
        Self::with_config(TableConfig::new())
            .unwrap_or_else(|err| panic!("cannot allocate default table: {err}"))
    }

    /// A table with at least `capacity` buckets and the default load factor.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_config(TableConfig::new().initial_capacity(capacity))
    }

    pub fn with_config(config: TableConfig) -> Result<Self, AllocError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<V> Default for BinTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> BinTable<V, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Result<Self, AllocError> {
        Self::with_config_and_hasher(TableConfig::new(), hasher)
    }

    /// # Panics
    /// If `config.load_factor` is not finite and positive.
    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, AllocError> {
        let TableConfig {
            initial_capacity,
            load_factor,
        } = config;
        assert!(
            load_factor.is_finite() && load_factor > 0.0,
            "load factor must be finite and positive, got {load_factor}"
        );
        let capacity = growth::directory_capacity(initial_capacity).ok_or(
            AllocError::CapacityOverflow {
                requested: initial_capacity,
            },
        )?;
        let directory = DynArray::from_elem(None, capacity)?;
        Ok(Self {
            hasher,
            directory,
            entries: SlotMap::with_key(),
            load_factor,
            threshold: growth::resize_threshold(capacity, load_factor),
        })
    }

    /// Number of live entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Number of buckets in the directory.
    pub fn capacity(&self) -> usize {
        self.directory.len()
    }
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn hash_key(&self, key: &[u8]) -> u64 {
        let mut h = self.hasher.build_hasher();
        h.write(key);
        h.finish()
    }

    // Directory must be non-empty.
    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.directory.len() - 1)
    }

    /// Newest entry matching `key`, with its chain predecessor.
    fn locate(&self, key: &[u8]) -> Option<(Option<EntryKey>, EntryKey)> {
        if self.directory.is_empty() {
            return None;
        }
        let hash = self.hash_key(key);
        let mut prev = None;
        let mut cursor = self.directory[self.bucket_of(hash)];
        while let Some(k) = cursor {
            let entry = &self.entries[k];
            if entry.hash == hash && &*entry.key == key {
                return Some((prev, k));
            }
            prev = Some(k);
            cursor = entry.next;
        }
        None
    }

    /// Insert a copy of `key` mapped to `value`.
    ///
    /// An existing entry with the same key is kept and shadowed by the new
    /// one. On error nothing was inserted and `value` is dropped.
    pub fn add(&mut self, key: &[u8], value: V) -> Result<(), AllocError> {
        let owned = copy_key(key).inspect_err(|err| {
            log::warn!("bin_table: cannot copy {}-byte key: {err}", key.len());
        })?;
        self.reserve_entries(1)?;
        if self.directory.is_empty() || self.len() > self.threshold {
            self.grow()?;
        }
        let hash = self.hash_key(key);
        let bucket = self.bucket_of(hash);
        let next = self.directory[bucket];
        let k = self.entries.insert(Entry {
            key: owned,
            value,
            hash,
            next,
        });
        self.directory[bucket] = Some(k);
        Ok(())
    }

    fn reserve_entries(&mut self, additional: usize) -> Result<(), AllocError> {
        self.entries.try_reserve(additional).inspect_err(|err| {
            log::warn!("bin_table: cannot reserve {additional} more entries: {err}");
        })?;
        Ok(())
    }

    // Double the directory and relink every entry. The new directory is
    // the only allocation; once it exists relinking cannot fail.
    fn grow(&mut self) -> Result<(), AllocError> {
        let old_capacity = self.directory.len();
        let new_capacity = growth::grow(old_capacity).ok_or(AllocError::CapacityOverflow {
            requested: old_capacity,
        })?;
        let mut directory: DynArray<Option<EntryKey>> =
            DynArray::from_elem(None, new_capacity).inspect_err(|err| {
                log::warn!("bin_table: cannot grow directory to {new_capacity} buckets: {err}");
            })?;

        let mask = new_capacity - 1;
        for i in 0..old_capacity {
            // bucket i splits into i and i + old_capacity; appending at
            // the tails keeps chain order
            let mut lo_tail: Option<EntryKey> = None;
            let mut hi_tail: Option<EntryKey> = None;
            let mut cursor = self.directory[i];
            while let Some(k) = cursor {
                let entry = &mut self.entries[k];
                cursor = entry.next.take();
                let b = (entry.hash as usize) & mask;
                debug_assert!(b == i || b == i + old_capacity);
                let tail = if b == i { &mut lo_tail } else { &mut hi_tail };
                match *tail {
                    None => directory[b] = Some(k),
                    Some(t) => self.entries[t].next = Some(k),
                }
                *tail = Some(k);
            }
        }

        log::trace!(
            "bin_table: rehashed {} entries, {} -> {} buckets",
            self.entries.len(),
            old_capacity,
            new_capacity
        );
        self.directory = directory;
        self.threshold = growth::resize_threshold(new_capacity, self.load_factor);
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let (_, k) = self.locate(key)?;
        self.entries.get(k).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let (_, k) = self.locate(key)?;
        self.entries.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.locate(key).is_some()
    }

    /// Replace the value of the newest entry for `key`.
    ///
    /// Returns the previous value, or hands `value` back as `Err` when the
    /// key is absent. Never inserts.
    pub fn set(&mut self, key: &[u8], value: V) -> Result<V, V> {
        match self.get_mut(key) {
            Some(slot) => Ok(core::mem::replace(slot, value)),
            None => Err(value),
        }
    }

    /// Unlink and return the newest entry for `key`.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let (prev, k) = self.locate(key)?;
        let entry = self.entries.remove(k)?;
        match prev {
            None => {
                let b = self.bucket_of(entry.hash);
                self.directory[b] = entry.next;
            }
            Some(p) => self.entries[p].next = entry.next,
        }
        Some(entry.value)
    }

    /// Free every entry and the directory. A later `add` starts over from
    /// a single bucket.
    pub fn release(&mut self) {
        self.release_with(|_, _| {});
    }

    /// Like `release`, handing each key and value to `callback` first.
    pub fn release_with<F>(&mut self, mut callback: F)
    where
        F: FnMut(&[u8], V),
    {
        // Detach everything first: the table is already empty and
        // consistent while the callback runs.
        let entries = core::mem::take(&mut self.entries);
        self.directory.release();
        self.threshold = 0;
        log::debug!("bin_table: released {} entries", entries.len());
        for (_, entry) in entries {
            callback(&entry.key[..], entry.value);
        }
    }
}

impl<V, S> BinTable<V, S> {
    /// Every live entry exactly once, bucket by bucket and each chain
    /// newest first. `iter_mut` visits the same entries in another order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            directory: self.directory.iter(),
            entries: &self.entries,
            cursor: None,
            remaining: self.entries.len(),
        }
    }

    /// Mutable access to every value, each live entry exactly once.
    ///
    /// Walks the entry arena, not the buckets, so the order generally
    /// differs from `iter` and does not put duplicates newest first.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            it: self.entries.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Keys in iteration order as lowercase hex, each followed by a space.
    /// Skips `offset` keys and renders at most `count` (`None` for all).
    pub fn keys_hex(&self, offset: usize, count: Option<usize>) -> String {
        let mut out = String::new();
        for key in self.keys().skip(offset).take(count.unwrap_or(usize::MAX)) {
            let _ = write!(out, "{:?} ", HexKey(key));
        }
        out
    }
}

fn copy_key(key: &[u8]) -> Result<Box<[u8]>, AllocError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(key.len())?;
    buf.extend_from_slice(key);
    Ok(buf.into_boxed_slice())
}

/// Iterator over `(key, value)` pairs of a `BinTable`.
pub struct Iter<'a, V> {
    directory: core::slice::Iter<'a, Option<EntryKey>>,
    entries: &'a SlotMap<EntryKey, Entry<V>>,
    cursor: Option<EntryKey>,
    remaining: usize,
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            entries: self.entries,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entries: &'a SlotMap<EntryKey, Entry<V>> = self.entries;
        loop {
            if let Some(k) = self.cursor {
                let entry = &entries[k];
                self.cursor = entry.next;
                self.remaining -= 1;
                return Some((&*entry.key, &entry.value));
            }
            self.cursor = *self.directory.next()?;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over `(key, &mut value)` pairs of a `BinTable`.
pub struct IterMut<'a, V> {
    it: slotmap::basic::IterMut<'a, EntryKey, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a [u8], &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&*e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, V, S> IntoIterator for &'a BinTable<V, S> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V, S> IntoIterator for &'a mut BinTable<V, S> {
    type Item = (&'a [u8], &'a mut V);
    type IntoIter = IterMut<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

struct HexKey<'a>(&'a [u8]);

impl fmt::Debug for HexKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

struct Chain<'a, V> {
    entries: &'a SlotMap<EntryKey, Entry<V>>,
    head: EntryKey,
}

impl<V: fmt::Debug> fmt::Debug for Chain<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = core::iter::successors(self.entries.get(self.head), |e| {
            e.next.and_then(|k| self.entries.get(k))
        });
        f.debug_list()
            .entries(chain.map(|e| (HexKey(&e.key), &e.value)))
            .finish()
    }
}

// Non-empty buckets by index, each chain head to tail.
impl<V: fmt::Debug, S> fmt::Debug for BinTable<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, head) in self.directory.iter().enumerate() {
            if let Some(head) = *head {
                map.entry(
                    &i,
                    &Chain {
                        entries: &self.entries,
                        head,
                    },
                );
            }
        }
        map.finish()
    }
}
