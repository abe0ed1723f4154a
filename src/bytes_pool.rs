//! A pool of reference-counted byte blocks, sharded by size class.

use std::sync::Arc;

use crate::block::Block;
use crate::class_pools::ClassPools;
use crate::error::PoolResult;
use crate::size_class::SizeClassTable;
use crate::stats::StatsSnapshot;

/// A concurrent pool handing out [`Block`]s in a fixed set of size classes.
///
/// Requests that exceed every class are still satisfied, by a one-shot
/// allocation that is simply dropped on release instead of being cached.
pub struct BytesPool {
    shared: Arc<ClassPools>,
}

impl BytesPool {
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

    /// Acquires a block with a user view of exactly `n` bytes and refcount 1.
    pub fn get(&self, n: usize) -> Block {
        self.shared.acquire(n, n)
    }

    /// Clears every per-class pool's cached blocks. Blocks already handed out
    /// are unaffected and release normally when their count reaches zero.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Per-class usage snapshots, in the same order as [`BytesPool::classes`].
    pub fn stats(&self) -> Vec<StatsSnapshot> {
        self.shared.stats()
    }
}
