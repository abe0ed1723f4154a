//! A [`Block`] plus the `(reserved, original, current)` length triplet that
//! gives callers a zero-copy header prefix ahead of a resizable user region.

use portable_atomic::{AtomicUsize, Ordering};

use crate::block::Block;

/// A reference-counted buffer with a reserved header region and a
/// shrinkable (never growable) user region.
///
/// `reserved_view` always covers `[0, R)`. `user_view` covers `[R, R+C)`
/// where `C` starts equal to `O` (the size requested at acquisition) and can
/// only be reduced, never grown past `O`, via [`Buffer::set_size`].
pub struct Buffer {
    block: Block,
    reserved: usize,
    original: usize,
    current: AtomicUsize,
}

impl Buffer {
    pub(crate) fn new(block: Block, reserved: usize, required: usize) -> Self {
        Buffer {
            block,
            reserved,
            original: required,
            current: AtomicUsize::new(required),
        }
    }

    /// The reserved header length, `R`.
    pub fn reserved_len(&self) -> usize {
        self.reserved
    }

    /// The original user-visible length at acquisition, `O`.
    pub fn original_len(&self) -> usize {
        self.original
    }

    /// The current user-visible length, `C`.
    pub fn current_len(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// The underlying block's full capacity.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// The reserved header bytes, `[0, R)`.
    pub fn reserved_view(&self) -> &[u8] {
        &self.block.raw()[..self.reserved]
    }

    /// Mutable access to the reserved header bytes.
    pub fn reserved_view_mut(&self) -> &mut [u8] {
        &mut self.block.raw_mut()[..self.reserved]
    }

    /// The user-visible bytes, `[R, R+C)`.
    pub fn user_view(&self) -> &[u8] {
        let r = self.reserved;
        let c = self.current_len();
        &self.block.raw()[r..r + c]
    }

    /// Mutable access to the user-visible bytes.
    pub fn user_view_mut(&self) -> &mut [u8] {
        let r = self.reserved;
        let c = self.current_len();
        &mut self.block.raw_mut()[r..r + c]
    }

    /// Shrinks (or restores) the user-visible length to `new_c`.
    ///
    /// # Panics
    /// Panics if `new_c` is zero or exceeds `original_len()`. Growing past
    /// the length requested at acquisition is never allowed, even if the
    /// backing block has spare capacity — see the crate-level docs for why
    /// this is the stricter of the two rules the design considered.
    pub fn set_size(&self, new_c: usize) {
        assert!(
            new_c > 0 && new_c <= self.original,
            "set_size({new_c}) violates 0 < C <= O ({})",
            self.original
        );
        self.current.store(new_c, Ordering::Release);
    }

    /// Restores the user-visible length to `original_len()`.
    pub fn reset_size(&self) {
        self.current.store(self.original, Ordering::Release);
    }

    /// The live reference count. Diagnostic only.
    pub fn refcount(&self) -> i32 {
        self.block.refcount()
    }

    /// Increments the reference count. See [`Block::add_ref`].
    pub fn add_ref(&self) {
        self.block.add_ref();
    }

    /// Decrements the reference count, returning the backing block to its
    /// pool on the final release. See [`Block::dec_ref`].
    pub fn dec_ref(&self) {
        self.block.dec_ref();
    }
}

impl Clone for Buffer {
    /// Copies the handle without bumping the reference count; pair with
    /// [`Buffer::add_ref`] before handing the clone to another holder.
    fn clone(&self) -> Self {
        Buffer {
            block: self.block.clone(),
            reserved: self.reserved,
            original: self.original,
            current: AtomicUsize::new(self.current_len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::block::BlockOwner;
    use std::sync::Arc;

    #[test]
    fn buffer_is_send_and_sync() {
        assert_impl_all!(Buffer: Send, Sync);
    }

    struct NullOwner;
    impl BlockOwner for NullOwner {
        fn reclaim(&self, _class_index: Option<usize>, _raw: Vec<u8>) {}
    }

    fn test_buffer(reserved: usize, required: usize, capacity: usize) -> Buffer {
        let block = Block::new(capacity, capacity, Some(0), Arc::new(NullOwner));
        Buffer::new(block, reserved, required)
    }

    #[test]
    fn views_start_at_the_right_offsets() {
        let buf = test_buffer(8, 32, 64);
        assert_eq!(buf.reserved_view().len(), 8);
        assert_eq!(buf.user_view().len(), 32);
        assert_eq!(buf.current_len(), 32);
        assert_eq!(buf.original_len(), 32);
    }

    #[test]
    fn set_size_shrinks_user_view() {
        let buf = test_buffer(8, 32, 64);
        buf.set_size(10);
        assert_eq!(buf.user_view().len(), 10);
        assert_eq!(buf.current_len(), 10);
    }

    #[test]
    fn reset_size_restores_original() {
        let buf = test_buffer(8, 32, 64);
        buf.set_size(10);
        buf.reset_size();
        assert_eq!(buf.current_len(), 32);
    }

    #[test]
    #[should_panic(expected = "violates 0 < C <= O")]
    fn set_size_above_original_panics() {
        let buf = test_buffer(8, 32, 64);
        buf.set_size(33);
    }

    #[test]
    #[should_panic(expected = "violates 0 < C <= O")]
    fn set_size_zero_panics() {
        let buf = test_buffer(8, 32, 64);
        buf.set_size(0);
    }
}
