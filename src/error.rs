use alloc::collections::TryReserveError;
use core::fmt;

use thiserror::Error;

/// Failure of a fallible index mutation.
///
/// Logical outcomes (key already present, key absent) are never errors; they are
/// reported as `bool` or `Option` results by the operations themselves.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum IndexError {
    /// The allocator could not provide room for a new node.
    #[error("index allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
    /// The index already addresses as many nodes as its handles can name.
    #[error("index is at maximum capacity ({max} elements)")]
    CapacityExceeded { max: usize },
    /// An entry was found in one index of a pair but not in the other.
    #[error("entry is present in the {present} index but missing from the {missing} index")]
    Desynchronized { present: Side, missing: Side },
}

/// One of the two indexes maintained by a [`DualIndex`](crate::DualIndex).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Identity,
    Rank,
}

impl Side {
    pub(crate) const fn other(self) -> Self {
        match self {
            Side::Identity => Side::Rank,
            Side::Rank => Side::Identity,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Identity => f.write_str("identity"),
            Side::Rank => f.write_str("rank"),
        }
    }
}

/// A broken structural invariant, as reported by
/// [`AvlTree::check_invariants`](crate::AvlTree::check_invariants).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Violation {
    #[error("node at in-order position {position} has balance factor {balance}")]
    Unbalanced { position: usize, balance: i32 },
    #[error("node at in-order position {position} caches height {cached} but its subtree is {actual} high")]
    HeightMismatch { position: usize, cached: u8, actual: u8 },
    #[error("elements at in-order positions {position} and {} are not strictly ascending", .position + 1)]
    Unordered { position: usize },
    #[error("index reports {reported} elements but {reachable} are reachable from the root")]
    LenMismatch { reported: usize, reachable: usize },
}
