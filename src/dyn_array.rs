//! DynArray: contiguous growable buffer with fallible growth.
//!
//! The array keeps its own logical `capacity` next to the backing `Vec`
//! so that capacity bookkeeping follows the shared growth policy exactly,
//! whatever extra room the allocator hands back. Growth goes through
//! `Vec::try_reserve_exact`, so an allocation failure is reported as
//! `AllocError` with the array untouched instead of aborting.

use crate::error::AllocError;
use crate::growth;
use core::fmt;
use core::ops::{Deref, DerefMut};

pub struct DynArray<T> {
    buf: Vec<T>,
    // logical capacity; `buf.capacity() >= cap` always
    cap: usize,
}

impl<T> DynArray<T> {
    /// The empty array: capacity 0, no storage.
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            cap: 0,
        }
    }

    /// Allocate storage for `capacity` elements up front.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let mut array = Self::new();
        array.expand(capacity)?;
        Ok(array)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Whether backing storage is currently held (`capacity() > 0`).
    pub fn has_storage(&self) -> bool {
        self.cap > 0
    }

    /// Grow capacity to exactly `new_capacity`. Requests that would not
    /// enlarge the array are no-ops. Existing elements keep their indices
    /// but may move in memory.
    pub fn expand(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.cap {
            return Ok(());
        }
        self.buf.try_reserve_exact(new_capacity - self.buf.len())?;
        log::trace!("dyn_array: capacity {} -> {}", self.cap, new_capacity);
        self.cap = new_capacity;
        Ok(())
    }

    /// Append `value`, growing geometrically when full.
    ///
    /// On failure the array is unchanged and `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        if self.buf.len() == self.cap {
            let new_capacity = growth::grow(self.cap).ok_or(AllocError::CapacityOverflow {
                requested: self.cap,
            })?;
            if let Err(err) = self.expand(new_capacity) {
                log::warn!("dyn_array: push could not grow to {new_capacity}: {err}");
                return Err(err);
            }
        }
        self.buf.push(value);
        Ok(())
    }

    /// Remove the last element. Empty arrays stay empty.
    pub fn pop(&mut self) -> Option<T> {
        self.buf.pop()
    }

    /// Drop every element but keep the storage.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Drop every element and free the storage. Safe to call repeatedly.
    pub fn release(&mut self) {
        self.buf = Vec::new();
        self.cap = 0;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf
    }
}

impl<T: Clone> DynArray<T> {
    /// An array of capacity `n` holding `n` clones of `elem`.
    pub fn from_elem(elem: T, n: usize) -> Result<Self, AllocError> {
        let mut array = Self::with_capacity(n)?;
        // capacity already reserved: no reallocation here
        array.buf.resize(n, elem);
        Ok(array)
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        let buf = self.buf.clone();
        let cap = buf.len();
        Self { buf, cap }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.buf.iter()).finish()
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &[T] {
        &self.buf
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.buf.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.buf.iter_mut()
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.buf.into_iter()
    }
}
