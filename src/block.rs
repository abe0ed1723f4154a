//! The reference-counted byte block returned by [`crate::BytesPool`] and
//! embedded inside [`crate::Buffer`].

use core::cell::UnsafeCell;
use portable_atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Something capable of reclaiming a block's raw storage once its reference
/// count drops to zero. Implemented by the per-class-pool group backing
/// [`crate::BytesPool`] and [`crate::BufferPool`], so `Block` itself stays
/// ignorant of which kind of pool it came from.
pub(crate) trait BlockOwner: Send + Sync {
    fn reclaim(&self, class_index: Option<usize>, raw: Vec<u8>);
}

struct BlockInner {
    capacity: usize,
    buf: UnsafeCell<Vec<u8>>,
    view_len: usize,
    refcount: AtomicI32,
    class_index: Option<usize>,
    owner: Arc<dyn BlockOwner>,
}

// `UnsafeCell<Vec<u8>>` access is gated by the refcount contract documented
// on `as_mut_slice`: only the current sole holder of a live reference may
// take the `_mut` path at a given time.
unsafe impl Sync for BlockInner {}

/// A fixed-capacity byte region with a manually managed reference count.
///
/// `Block` does not use Rust's ownership model to track its lifetime the way
/// `Arc` does; cloning a handle is a raw copy and does *not* bump the
/// reference count on its own. Every additional holder of a `Block` must call
/// [`Block::add_ref`] once before the clone starts its own life, and call
/// [`Block::dec_ref`] exactly once when done — the same discipline the
/// pool's originating design expects from its callers.
pub struct Block {
    inner: Arc<BlockInner>,
}

impl Block {
    pub(crate) fn new(
        capacity: usize,
        view_len: usize,
        class_index: Option<usize>,
        owner: Arc<dyn BlockOwner>,
    ) -> Self {
        Self::from_raw(vec![0u8; capacity], view_len, class_index, owner)
    }

    /// Rebuilds a block around raw storage pulled back out of a pool,
    /// avoiding a fresh allocation on a cache hit.
    pub(crate) fn from_raw(
        raw: Vec<u8>,
        view_len: usize,
        class_index: Option<usize>,
        owner: Arc<dyn BlockOwner>,
    ) -> Self {
        let capacity = raw.len();
        debug_assert!(view_len <= capacity);

        Block {
            inner: Arc::new(BlockInner {
                capacity,
                buf: UnsafeCell::new(raw),
                view_len,
                refcount: AtomicI32::new(1),
                class_index,
                owner,
            }),
        }
    }

    /// The block's fixed backing capacity, equal to the size class it was
    /// drawn from (or the exact requested size for an oversize block).
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// The live reference count. Diagnostic only; nothing in the pool reads
    /// this to make decisions.
    pub fn refcount(&self) -> i32 {
        self.inner.refcount.load(Ordering::Acquire)
    }

    /// Raw access to the full backing storage, `capacity()` bytes long.
    pub(crate) fn raw(&self) -> &[u8] {
        unsafe { &*self.inner.buf.get() }
    }

    /// # Safety contract
    /// The caller must hold the sole intended-to-be-mutating reference at
    /// the time of the call; the block does not serialize concurrent access
    /// to its storage on the caller's behalf.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn raw_mut(&self) -> &mut [u8] {
        unsafe { &mut *self.inner.buf.get() }
    }

    /// The view established at acquisition.
    pub fn as_slice(&self) -> &[u8] {
        &self.raw()[..self.inner.view_len]
    }

    /// Mutable access to the acquisition-time view.
    pub fn as_mut_slice(&self) -> &mut [u8] {
        let len = self.inner.view_len;
        &mut self.raw_mut()[..len]
    }

    /// Increments the reference count for an additional holder.
    ///
    /// # Panics
    /// Panics if the count was not already positive — adding a reference to
    /// a block that has already returned to its pool is a use-after-free.
    pub fn add_ref(&self) {
        let prev = self.inner.refcount.fetch_add(1, Ordering::AcqRel);
        assert!(prev > 0, "add_ref on a block with refcount {prev}");
    }

    /// Decrements the reference count. When it reaches zero, the block
    /// returns its storage to the owning pool and this handle (and any
    /// outstanding clones) must not be used again.
    ///
    /// # Panics
    /// Panics if the count was already zero — a double free.
    pub fn dec_ref(&self) {
        let prev = self.inner.refcount.fetch_sub(1, Ordering::AcqRel);
        assert!(prev > 0, "dec_ref on a block with refcount {prev}");

        if prev == 1 {
            let raw = core::mem::take(unsafe { &mut *self.inner.buf.get() });
            self.inner.owner.reclaim(self.inner.class_index, raw);
        }
    }
}

impl Clone for Block {
    /// Copies the handle without touching the reference count. Pair every
    /// clone with a preceding [`Block::add_ref`] to keep the count honest.
    fn clone(&self) -> Self {
        Block {
            inner: Arc::clone(&self.inner),
        }
    }
}
