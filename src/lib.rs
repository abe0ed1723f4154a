//! A concurrent, size-classed memory pool for reference-counted byte buffers.
//!
//! The design mirrors Go's `sync.Pool`: each logical executor gets a private,
//! lock-free register plus a bounded, lock-guarded shared stack, with
//! cross-executor stealing on a miss and a plain allocation as the last
//! resort. On top of that generic pool sit two size-classed layers —
//! [`BytesPool`] for plain reference-counted [`Block`]s, and [`BufferPool`]
//! for [`Buffer`]s that additionally carry a reserved header region ahead of
//! a resizable user region.
//!
//! # Errors vs. panics
//!
//! Construction (`Pool::new`, `BytesPool::new`, `BufferPool::new`) is
//! fallible and returns [`PoolError`] on a malformed size-class table or a
//! non-positive `local_cap`. Everything else the pool can get wrong at
//! runtime — adding a reference to an already-released block, releasing one
//! twice, or growing a buffer's current length past its original length —
//! is a contract violation between cooperating callers, not a recoverable
//! error, and panics instead.
//!
//! # Executors without `GOMAXPROCS`
//!
//! Rust has no equivalent of `runtime_procPin`: there is no small, stable
//! set of logical executors backing an arbitrary number of OS threads. The
//! [`pin`] module fills the gap with a cheap fallback — each OS thread is
//! assigned a slot index once, round-robin over [`pin::parallelism`], cached
//! in thread-local storage for the rest of its life.

mod block;
mod class_pools;

pub mod buffer;
pub mod buffer_pool;
pub mod bytes_pool;
pub mod error;
pub mod global;
pub mod pin;
pub mod pool;
pub mod size_class;
pub mod stats;

pub use block::Block;
pub use buffer::Buffer;
pub use buffer_pool::BufferPool;
pub use bytes_pool::BytesPool;
pub use error::{PoolError, PoolResult};
pub use global::{default_buffer_pool, default_bytes_pool, DEFAULT_LOCAL_CAP};
pub use pin::{parallelism, pin, PinGuard};
pub use pool::Pool;
pub use size_class::{SizeClassTable, DEFAULT_CLASSES};
pub use stats::{Stats, StatsSnapshot};
