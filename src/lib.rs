//! bintable: a binary-keyed chained hash table and the growable array it
//! is built on.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small indexing primitive whose growth never leaves a
//!   structure half-mutated, and whose keys are raw byte strings of any
//!   content (embedded zero bytes included).
//! - Layers:
//!   - growth: one geometric growth rule (doubling) shared by every
//!     structure, plus power-of-two directory rounding.
//!   - DynArray<T>: contiguous buffer with fallible `push`/`expand`,
//!     `pop` that never underflows, and `clear` vs `release`.
//!   - SlotArray<T>: cells with gaps and a free-cell stack on top of two
//!     `DynArray`s; O(1) insert and remove with stable indices.
//!   - BinTable<V, S>: bucket directory (`DynArray` of chain heads) over an
//!     entry arena; chains link by arena key, not by address.
//!
//! Constraints
//! - Single-threaded: no internal synchronization.
//! - Allocation failure on growth is an `AllocError`, never a partial
//!   update. That covers the directory, the entry arena, key copies
//!   and array storage.
//! - Keys are copied; lookups compare the full byte slice.
//!
//! Duplicate keys
//! - `BinTable::add` never replaces. Entries for the same key stack up
//!   and the newest one is visible to `get`, `set` and `remove`. Use
//!   `set` to update a value in place.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its `u64` hash; a resize relinks entries using the
//!   stored hash and never calls the hasher.
//! - The directory doubles once `len > capacity * load_factor`, checked
//!   before linking a new entry. Each old bucket splits into two new ones
//!   with chain order kept.
//!
//! Iteration
//! - `BinTable::iter` walks the directory bucket by bucket and each chain
//!   head to tail, visiting every live entry once. The borrow it holds
//!   rules out mutation while it is alive.

mod config;
pub mod dyn_array;
mod error;
pub mod growth;
pub mod slot_array;
pub mod table;
mod table_proptest;

// Public surface
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use dyn_array::DynArray;
pub use error::AllocError;
pub use slot_array::SlotArray;
pub use table::BinTable;
