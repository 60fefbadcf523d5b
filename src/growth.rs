//! Capacity growth shared by `DynArray`, `SlotArray` and the table directory.

/// Multiplier applied on every growth step.
pub const GROWTH_FACTOR: usize = 2;

/// Next capacity after `capacity`: `1` from empty, otherwise doubled.
///
/// Returns `None` when the result does not fit in `usize`. The result is
/// always strictly greater than `capacity`, and doubling keeps a power of
/// two a power of two.
#[inline]
pub fn grow(capacity: usize) -> Option<usize> {
    if capacity == 0 {
        Some(1)
    } else {
        capacity.checked_mul(GROWTH_FACTOR)
    }
}

/// Directory length for a requested bucket count.
#[inline]
pub fn directory_capacity(requested: usize) -> Option<usize> {
    requested.max(1).checked_next_power_of_two()
}

/// Largest entry count a directory of `capacity` buckets holds before it
/// has to grow.
#[inline]
pub fn resize_threshold(capacity: usize, load_factor: f32) -> usize {
    // float -> int `as` saturates
    (capacity as f64 * f64::from(load_factor)) as usize
}
