//! A pool of reference-counted buffers, each with a reserved header region
//! ahead of a resizable user region, sharded by size class.

use std::sync::Arc;

use crate::buffer::Buffer;
use crate::class_pools::ClassPools;
use crate::error::PoolResult;
use crate::size_class::SizeClassTable;
use crate::stats::StatsSnapshot;

/// A concurrent pool handing out [`Buffer`]s, identical to [`crate::BytesPool`]
/// except the underlying block capacity is `reserved + required` and the
/// resulting handle carries that split.
pub struct BufferPool {
    shared: Arc<ClassPools>,
}

impl BufferPool {
    /// Builds a pool from an explicit, validated ascending class table and a
    /// per-executor shared-stack bound.
    pub fn new(classes: SizeClassTable, local_cap: usize) -> PoolResult<Self> {
        Ok(Self {
            shared: Arc::new(ClassPools::new(classes, local_cap)?),
        })
    }

    /// Builds a pool from the default 25-class table spanning 16 B to 64 KiB.
    pub fn with_default_classes(local_cap: usize) -> PoolResult<Self> {
        Self::new(SizeClassTable::default_classes(), local_cap)
    }

    /// The size-class table this pool was built with.
    pub fn classes(&self) -> &SizeClassTable {
        self.shared.classes()
    }

    /// Acquires a buffer with `reserved_len() == reserved` and
    /// `original_len() == current_len() == required`. The backing block's
    /// capacity is `reserved + required`, rounded up to a size class.
    pub fn get(&self, reserved: usize, required: usize) -> Buffer {
        let capacity_needed = reserved + required;
        let block = self.shared.acquire(capacity_needed, capacity_needed);
        Buffer::new(block, reserved, required)
    }

    /// Clears every per-class pool's cached blocks. Buffers already handed
    /// out are unaffected and release normally when their count reaches
    /// zero.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Per-class usage snapshots, in the same order as
    /// [`BufferPool::classes`].
    pub fn stats(&self) -> Vec<StatsSnapshot> {
        self.shared.stats()
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    #[test]
    fn buffer_pool_is_send_and_sync() {
        assert_impl_all!(BufferPool: Send, Sync);
    }

    #[test]
    fn get_splits_reserved_and_user_regions() {
        let pool = BufferPool::with_default_classes(4).unwrap();
        let buf = pool.get(16, 100);
        assert_eq!(buf.reserved_len(), 16);
        assert_eq!(buf.original_len(), 100);
        assert_eq!(buf.current_len(), 100);
        assert_eq!(buf.capacity(), 128);
    }

    #[test]
    fn routing_on_release_uses_raw_capacity() {
        let pool = BufferPool::with_default_classes(4).unwrap();
        let first = pool.get(16, 100);
        let ptr = first.reserved_view().as_ptr();
        first.dec_ref();

        let second = pool.get(16, 100);
        assert_eq!(second.reserved_view().as_ptr(), ptr);
    }

    #[test]
    fn oversize_buffer_is_dropped_on_release() {
        let pool = BufferPool::with_default_classes(4).unwrap();
        let buf = pool.get(64, 1_000_000);
        assert_eq!(buf.capacity(), 1_000_064);
        buf.dec_ref();
    }

    #[test]
    fn shared_refcount_keeps_buffer_alive_until_last_release() {
        let pool = BufferPool::with_default_classes(4).unwrap();
        let buf = pool.get(8, 8);
        buf.add_ref();
        let clone = buf.clone();
        assert_eq!(clone.refcount(), 2);

        buf.dec_ref();
        assert_eq!(clone.user_view().len(), 8);
        clone.dec_ref();
    }
}
