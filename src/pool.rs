//! The generic, per-class object pool: a private register plus a bounded
//! shared stack per executor, with cross-executor stealing on miss.

use core::ptr;
use portable_atomic::{AtomicPtr, Ordering};
use spin::Mutex;

use crate::error::{PoolError, PoolResult};
use crate::pin::{parallelism, pin};
use crate::stats::{Stats, StatsSnapshot};

/// Pads `T` out to a full cache line so neighboring slots in the slot array
/// never share a line and thrash each other under contention.
#[repr(align(64))]
struct CacheLinePadded<T>(T);

impl<T> core::ops::Deref for CacheLinePadded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

struct Slot<T> {
    private: AtomicPtr<T>,
    shared: Mutex<Vec<T>>,
}

impl<T> Slot<T> {
    fn empty() -> Self {
        Slot {
            private: AtomicPtr::new(ptr::null_mut()),
            shared: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        let p = self.private.load(Ordering::Acquire);
        if !p.is_null() {
            drop(unsafe { Box::from_raw(p) });
        }
    }
}

/// A concurrent pool of `T`, sharded across `parallelism()` executor slots.
///
/// `acquire`/`release` never block on each other's progress beyond the short
/// per-slot lock held while touching a `shared` stack; the `private` register
/// is reached without any lock at all.
pub struct Pool<T> {
    slots: Vec<CacheLinePadded<Slot<T>>>,
    local_cap: usize,
    new_fn: Box<dyn Fn() -> T + Send + Sync>,
    stats: Stats,
}

impl<T> Pool<T> {
    /// Builds a pool with `local_cap` slots' worth of shared capacity per
    /// executor and `new_fn` as the miss-path factory.
    pub fn new<F>(local_cap: usize, new_fn: F) -> PoolResult<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        if local_cap == 0 {
            return Err(PoolError::NonPositiveCapacity);
        }

        Ok(Self {
            slots: Self::fresh_slots(),
            local_cap,
            new_fn: Box::new(new_fn),
            stats: Stats::new(),
        })
    }

    fn fresh_slots() -> Vec<CacheLinePadded<Slot<T>>> {
        (0..parallelism().max(1))
            .map(|_| CacheLinePadded(Slot::empty()))
            .collect()
    }

    /// The number of executor slots this pool was built (or last reset) with.
    pub fn parallelism(&self) -> usize {
        self.slots.len()
    }

    /// A snapshot of this pool's usage counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Retrieves a cached `T`, falling back to the factory on a total miss.
    ///
    /// Order of preference: the calling executor's private register, then its
    /// shared stack, then a scan stealing from every other executor's shared
    /// stack. The factory path never fails, so `get` always returns a value.
    pub fn get(&self) -> T {
        let guard = pin();
        let pid = guard.pid();
        let p = self.slots.len();

        if pid < p {
            let slot = &self.slots[pid];
            let private = slot.private.swap(ptr::null_mut(), Ordering::AcqRel);
            drop(guard);

            if !private.is_null() {
                self.stats.record_hit_private();
                return *unsafe { Box::from_raw(private) };
            }

            if let Some(v) = slot.shared.lock().pop() {
                self.stats.record_hit_shared();
                return v;
            }

            for i in 1..p {
                let other = &self.slots[(pid + i) % p];
                if let Some(v) = other.shared.lock().pop() {
                    self.stats.record_hit_stolen();
                    return v;
                }
            }
        } else {
            drop(guard);
        }

        self.stats.record_miss();
        (self.new_fn)()
    }

    /// Offers `value` back to the pool. A `None` is accepted and ignored.
    ///
    /// Tries the calling executor's private register first; if that is
    /// already occupied, falls back to the shared stack if it has room, or
    /// drops `value` on the floor otherwise.
    pub fn put(&self, value: Option<T>) {
        let Some(value) = value else { return };

        let guard = pin();
        let pid = guard.pid();
        let p = self.slots.len();

        if pid >= p {
            drop(guard);
            drop(value);
            self.stats.record_put_discarded();
            return;
        }

        let slot = &self.slots[pid];
        let boxed = Box::into_raw(Box::new(value));
        let outcome =
            slot.private
                .compare_exchange(ptr::null_mut(), boxed, Ordering::AcqRel, Ordering::Acquire);
        drop(guard);

        match outcome {
            Ok(_) => self.stats.record_put_absorbed(),
            Err(_) => {
                let value = *unsafe { Box::from_raw(boxed) };
                let mut shared = slot.shared.lock();
                if shared.len() + 1 < self.local_cap {
                    shared.push(value);
                    drop(shared);
                    self.stats.record_put_absorbed();
                } else {
                    drop(shared);
                    drop(value);
                    self.stats.record_put_discarded();
                }
            }
        }
    }

    /// Empties every slot's private register and shared stack in place.
    ///
    /// The slot array itself is not reallocated: `parallelism()` is assumed
    /// stable for the life of the process, so clearing in place lets `reset`
    /// take `&self` and run safely alongside concurrent `get`/`put` calls,
    /// the same way the rest of the pool does. Objects in flight (already
    /// handed out, not yet released) are unaffected; when later released
    /// they fall through the normal `put` path against the cleared slots.
    pub fn reset(&self) {
        for slot in &self.slots {
            let p = slot.private.swap(ptr::null_mut(), Ordering::AcqRel);
            if !p.is_null() {
                drop(unsafe { Box::from_raw(p) });
            }
            slot.shared.lock().clear();
        }
    }
}
