//! Allocation failure reported by every growing operation.

use std::collections::TryReserveError;

/// Backing storage could not be obtained or grown.
///
/// Whenever this is returned the structure that produced it is left
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// A capacity computation overflowed `usize`.
    #[error("requested capacity {requested} overflows the addressable range")]
    CapacityOverflow { requested: usize },
    /// The allocator refused the request.
    #[error("allocator could not provide storage: {0}")]
    Reserve(#[from] TryReserveError),
}
