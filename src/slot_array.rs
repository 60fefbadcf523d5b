//! SlotArray: array with gaps and a free-cell stack.
//!
//! Values are stored in cells addressed by a stable `usize` index. Insert
//! takes the most recently freed cell (or the lowest fresh one after
//! growth) and removal returns the cell to the free stack, both in O(1).
//! Indices are plain integers: after `remove(i)` a later `insert` may hand
//! out `i` again.

use crate::dyn_array::DynArray;
use crate::error::AllocError;
use crate::growth;

pub struct SlotArray<T> {
    cells: DynArray<Option<T>>,
    free: DynArray<usize>,
}

impl<T> SlotArray<T> {
    pub const fn new() -> Self {
        Self {
            cells: DynArray::new(),
            free: DynArray::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let mut slots = Self::new();
        slots.expand(capacity)?;
        Ok(slots)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len() - self.free.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Number of cells, occupied or not.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Store `value` in a vacant cell and return its index.
    pub fn insert(&mut self, value: T) -> Result<usize, AllocError> {
        if self.free.is_empty() {
            let new_capacity =
                growth::grow(self.capacity()).ok_or(AllocError::CapacityOverflow {
                    requested: self.capacity(),
                })?;
            if let Err(err) = self.expand(new_capacity) {
                log::warn!("slot_array: insert could not grow to {new_capacity}: {err}");
                return Err(err);
            }
        }
        let Some(idx) = self.free.pop() else {
            unreachable!("free stack refilled by expand");
        };
        self.cells[idx] = Some(value);
        Ok(idx)
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.cells.get(idx)?.as_ref()
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.cells.get_mut(idx)?.as_mut()
    }

    /// Vacate cell `idx`, returning its value. Out-of-range or already
    /// vacant cells yield `None`.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        let value = self.cells.get_mut(idx)?.take()?;
        // free never exceeds the cell count it was reserved for
        push_reserved(&mut self.free, idx);
        Some(value)
    }

    /// Drop every value; all cells become vacant, capacity is kept.
    pub fn clear(&mut self) {
        self.free.clear();
        for (idx, cell) in self.cells.iter_mut().enumerate().rev() {
            *cell = None;
            push_reserved(&mut self.free, idx);
        }
    }

    /// Occupied cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.as_ref().map(|v| (idx, v)))
    }

    // Reserve both buffers before filling either. If the second
    // reservation fails the first keeps its larger storage, but no cell
    // or free index has been added, so len and capacity are unchanged.
    fn expand(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        let old_capacity = self.capacity();
        if new_capacity <= old_capacity {
            return Ok(());
        }
        self.cells.expand(new_capacity)?;
        self.free.expand(new_capacity)?;
        log::trace!("slot_array: cells {old_capacity} -> {new_capacity}");
        for _ in old_capacity..new_capacity {
            push_reserved(&mut self.cells, None);
        }
        // highest index pushed first so the lowest fresh cell pops first
        for idx in (old_capacity..new_capacity).rev() {
            push_reserved(&mut self.free, idx);
        }
        Ok(())
    }
}

// Push into storage already reserved by `expand`.
fn push_reserved<T>(buf: &mut DynArray<T>, value: T) {
    debug_assert!(buf.len() < buf.capacity());
    if buf.push(value).is_err() {
        unreachable!("push within reserved capacity");
    }
}

impl<T> Default for SlotArray<T> {
    fn default() -> Self {
        Self::new()
    }
}
