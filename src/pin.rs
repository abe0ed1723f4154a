//! Executor pinning primitive.
//!
//! `Pool` needs a way to turn "the thread currently running" into a stable
//! integer in `[0, parallelism())` for the lifetime of a short critical
//! section, the way Go's runtime exposes `runtime_procPin`/`runtime_procUnpin`
//! for its P-indexed scheduler. Rust has no equivalent notion of a small,
//! stable set of logical executors backing an arbitrary number of OS threads,
//! so this module implements the fallback the design allows: each OS thread is
//! assigned a slot index once, the first time it pins, drawn from a
//! process-wide round-robin counter modulo `parallelism()` and cached in
//! thread-local storage. `pin`/`unpin` are then just a read of that cached
//! value — there is no migration to guard against, so the wait-free property
//! falls out for free.

use core::cell::Cell;
use portable_atomic::{AtomicUsize, Ordering};

/// The number of logical executors slots are sharded across.
///
/// Mirrors `runtime.GOMAXPROCS(0)` in the design this crate is based on.
/// Falls back to 1 if the platform cannot report available parallelism.
pub fn parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

thread_local! {
    static SLOT: Cell<Option<usize>> = const { Cell::new(None) };
}

static NEXT_SLOT: AtomicUsize = AtomicUsize::new(0);

/// A pinned executor id, valid for the scope of this guard.
///
/// Dropping the guard is equivalent to `unpin()`. No lock may be acquired
/// while a `PinGuard` is held, and the guard itself never blocks.
pub struct PinGuard {
    pid: usize,
}

impl PinGuard {
    /// The stable executor id for the current thread, in `[0, parallelism())`
    /// *as observed at the moment of the most recent pool reset*. Callers
    /// must still check this against the pool's current slot count, since
    /// parallelism (and thus slot count) can grow between a pin and a reset.
    pub fn pid(&self) -> usize {
        self.pid
    }
}

/// Pins the current thread, returning its stable slot index.
///
/// The index is assigned once per thread (round-robin over
/// `parallelism()`) and cached for the thread's lifetime; repeated calls
/// from the same thread always return the same index.
pub fn pin() -> PinGuard {
    let pid = SLOT.with(|slot| {
        if let Some(pid) = slot.get() {
            return pid;
        }

        let p = parallelism().max(1);
        let pid = NEXT_SLOT.fetch_add(1, Ordering::Relaxed) % p;
        slot.set(Some(pid));
        pid
    });

    PinGuard { pid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn pin_is_stable_for_a_thread() {
        let guard1 = pin();
        let pid1 = guard1.pid();
        drop(guard1);

        let guard2 = pin();
        assert_eq!(pid1, guard2.pid());
    }

    #[test]
    fn pin_assigns_within_parallelism_bound() {
        let p = parallelism();
        let guard = pin();
        assert!(guard.pid() < p);
    }

    #[test]
    fn concurrent_threads_get_valid_slots() {
        let p = parallelism();
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    pin().pid()
                })
            })
            .collect();

        let pids: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(pids.iter().all(|&pid| pid < p));
    }
}
