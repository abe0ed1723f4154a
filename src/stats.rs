//! Pool statistics.
//!
//! Every counter here is a relaxed, best-effort tally meant for diagnostics,
//! not for driving pool behavior; nothing in `Pool`, `BytesPool`, or
//! `BufferPool` reads these back to make decisions.

use portable_atomic::{AtomicU64, Ordering};

/// Atomic counters tracking where `get`/`put` calls were served from.
#[derive(Debug, Default)]
pub struct Stats {
    hits_private: AtomicU64,
    hits_shared: AtomicU64,
    hits_stolen: AtomicU64,
    misses: AtomicU64,
    puts_absorbed: AtomicU64,
    puts_discarded: AtomicU64,
}

/// A point-in-time, non-atomic snapshot of a [`Stats`] block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Gets served from the calling executor's private slot.
    pub hits_private: u64,
    /// Gets served by popping the calling executor's shared stack.
    pub hits_shared: u64,
    /// Gets served by stealing from another executor's shared stack.
    pub hits_stolen: u64,
    /// Gets that found nothing cached and fell back to `new`.
    pub misses: u64,
    /// Puts that were absorbed into a private or shared slot.
    pub puts_absorbed: u64,
    /// Puts dropped because every local slot was already full.
    pub puts_discarded: u64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit_private(&self) {
        self.hits_private.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit_shared(&self) {
        self.hits_shared.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit_stolen(&self) {
        self.hits_stolen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_put_absorbed(&self) {
        self.puts_absorbed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_put_discarded(&self) {
        self.puts_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough snapshot of all counters for reporting.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits_private: self.hits_private.load(Ordering::Relaxed),
            hits_shared: self.hits_shared.load(Ordering::Relaxed),
            hits_stolen: self.hits_stolen.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts_absorbed: self.puts_absorbed.load(Ordering::Relaxed),
            puts_discarded: self.puts_discarded.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Total successful `get` calls, whatever slot they were served from.
    pub fn total_hits(&self) -> u64 {
        self.hits_private + self.hits_shared + self.hits_stolen
    }

    /// Total `get` calls, hit or miss.
    pub fn total_gets(&self) -> u64 {
        self.total_hits() + self.misses
    }

    /// Total `put` calls, absorbed or discarded.
    pub fn total_puts(&self) -> u64 {
        self.puts_absorbed + self.puts_discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_starts_zeroed() {
        let stats = Stats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn recorded_events_are_visible_in_snapshot() {
        let stats = Stats::new();
        stats.record_hit_private();
        stats.record_hit_private();
        stats.record_hit_shared();
        stats.record_hit_stolen();
        stats.record_miss();
        stats.record_put_absorbed();
        stats.record_put_discarded();

        let snap = stats.snapshot();
        assert_eq!(snap.hits_private, 2);
        assert_eq!(snap.hits_shared, 1);
        assert_eq!(snap.hits_stolen, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.puts_absorbed, 1);
        assert_eq!(snap.puts_discarded, 1);
        assert_eq!(snap.total_hits(), 4);
        assert_eq!(snap.total_gets(), 5);
        assert_eq!(snap.total_puts(), 2);
    }
}
