//! Lazily-initialized, process-wide default pools.
//!
//! Most callers don't need an explicit [`BytesPool`]/[`BufferPool`] of their
//! own; these accessors hand out a shared instance built from the default
//! class table the first time either is touched, and reuse it afterward.

use std::sync::OnceLock;

use crate::buffer_pool::BufferPool;
use crate::bytes_pool::BytesPool;

/// The `local_cap` the process-wide default pools are built with.
pub const DEFAULT_LOCAL_CAP: usize = 8;

static DEFAULT_BYTES_POOL: OnceLock<BytesPool> = OnceLock::new();
static DEFAULT_BUFFER_POOL: OnceLock<BufferPool> = OnceLock::new();

/// The process-wide default bytes pool, built on first use from the default
/// class table and [`DEFAULT_LOCAL_CAP`].
pub fn default_bytes_pool() -> &'static BytesPool {
    DEFAULT_BYTES_POOL.get_or_init(|| {
        BytesPool::with_default_classes(DEFAULT_LOCAL_CAP).expect("default size classes are valid")
    })
}

/// The process-wide default buffer pool, built on first use from the default
/// class table and [`DEFAULT_LOCAL_CAP`].
pub fn default_buffer_pool() -> &'static BufferPool {
    DEFAULT_BUFFER_POOL.get_or_init(|| {
        BufferPool::with_default_classes(DEFAULT_LOCAL_CAP)
            .expect("default size classes are valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bytes_pool_is_shared_across_calls() {
        let a = default_bytes_pool() as *const BytesPool;
        let b = default_bytes_pool() as *const BytesPool;
        assert_eq!(a, b);
    }

    #[test]
    fn default_buffer_pool_is_shared_across_calls() {
        let a = default_buffer_pool() as *const BufferPool;
        let b = default_buffer_pool() as *const BufferPool;
        assert_eq!(a, b);
    }

    #[test]
    fn default_bytes_pool_serves_gets() {
        let block = default_bytes_pool().get(32);
        assert_eq!(block.as_slice().len(), 32);
        block.dec_ref();
    }
}
