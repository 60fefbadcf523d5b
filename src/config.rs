//! Construction parameters for `BinTable`.

/// Bucket count used by `BinTable::new`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Entries per bucket tolerated before the directory doubles.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Requested bucket count; rounded up to a power of two.
    pub initial_capacity: usize,
    /// Resize once `len > capacity * load_factor`. Must be finite and
    /// positive; large values trade lookups for memory.
    pub load_factor: f32,
}

impl TableConfig {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}
