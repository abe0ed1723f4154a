//! Construction-time error types.
//!
//! Everything else the pool can fail at (refcount misuse, oversize `set_size`)
//! is a contract violation and panics rather than returning a `Result` — see
//! the crate-level docs for the split between the two.

use core::fmt;

/// Reasons a [`crate::Pool`], [`crate::BytesPool`], or [`crate::BufferPool`] can
/// fail to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The size-class table was empty.
    EmptyClassTable,
    /// A size-class table entry was zero or negative.
    NonPositiveClass,
    /// The size-class table was not strictly ascending.
    UnorderedClassTable,
    /// `local_cap` was zero (the shared stack must hold at least one object).
    NonPositiveCapacity,
}

impl PoolError {
    /// A short, stable description suitable for logging or display.
    pub fn as_str(self) -> &'static str {
        match self {
            PoolError::EmptyClassTable => "size-class table must not be empty",
            PoolError::NonPositiveClass => "size-class table entries must be positive",
            PoolError::UnorderedClassTable => "size-class table must be strictly ascending",
            PoolError::NonPositiveCapacity => "local_cap must be greater than zero",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for PoolError {}

/// Result alias for fallible pool construction.
pub type PoolResult<T> = Result<T, PoolError>;
