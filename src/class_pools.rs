//! Shared machinery behind [`crate::BytesPool`] and [`crate::BufferPool`]: a
//! vector of per-class [`Pool`]s parallel to a [`SizeClassTable`], plus the
//! glue that turns a class hit or miss into a [`Block`].

use std::sync::Arc;

use crate::block::{Block, BlockOwner};
use crate::error::PoolResult;
use crate::pool::Pool;
use crate::size_class::SizeClassTable;
use crate::stats::StatsSnapshot;

pub(crate) struct ClassPools {
    classes: SizeClassTable,
    pools: Vec<Pool<Vec<u8>>>,
}

impl ClassPools {
    pub(crate) fn new(classes: SizeClassTable, local_cap: usize) -> PoolResult<Self> {
        let mut pools = Vec::with_capacity(classes.len());
        for &capacity in classes.as_slice() {
            pools.push(Pool::new(local_cap, move || vec![0u8; capacity])?);
        }

        Ok(Self { classes, pools })
    }

    pub(crate) fn classes(&self) -> &SizeClassTable {
        &self.classes
    }

    /// Acquires a block able to hold at least `capacity_needed` bytes, with
    /// its acquisition-time view set to `view_len` bytes.
    ///
    /// Routes through the matching size class when one fits; otherwise
    /// allocates a one-shot, uncached block of the exact size requested.
    pub(crate) fn acquire(self: &Arc<Self>, capacity_needed: usize, view_len: usize) -> Block {
        let owner: Arc<dyn BlockOwner> = Arc::clone(self);

        match self.classes.index_for(capacity_needed) {
            Some(index) => {
                let raw = self.pools[index].get();
                Block::from_raw(raw, view_len, Some(index), owner)
            }
            None => Block::new(capacity_needed, view_len, None, owner),
        }
    }

    pub(crate) fn reset(&self) {
        for pool in &self.pools {
            pool.reset();
        }
    }

    pub(crate) fn stats(&self) -> Vec<StatsSnapshot> {
        self.pools.iter().map(Pool::stats).collect()
    }
}

impl BlockOwner for ClassPools {
    fn reclaim(&self, class_index: Option<usize>, raw: Vec<u8>) {
        match class_index {
            Some(index) => self.pools[index].put(Some(raw)),
            None => drop(raw),
        }
    }
}
