// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters are shared by every branch of a search (and by the cache that
//! serves it), so they are atomics rather than plain integers.

use std::sync::atomic::{AtomicU64, Ordering};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(EnumCountMacro, EnumIter, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    CoversTried,
    CacheHits,
    CacheMisses,
    FailuresStored,
    SceneHits,
    StaleEntries,
}

#[derive(Debug)]
pub struct Statistics {
    stats: [AtomicU64; Counters::COUNT],
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            stats: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn increment(&self, counter: Counters) {
        self.add(counter, 1);
    }

    pub fn add(&self, counter: Counters, n: u64) {
        self.stats[counter as usize].fetch_add(n, Ordering::Relaxed);
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize].load(Ordering::Relaxed)
    }

    /// Emit every counter as one debug event.
    pub fn log(&self) {
        let summary: Vec<String> = Counters::iter()
            .map(|c| format!("{}={}", <&'static str>::from(c), self.get(c)))
            .collect();
        tracing::debug!(stats = %summary.join(" "), "search statistics");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let stats = Statistics::new();
        stats.increment(Counters::CacheHits);
        stats.increment(Counters::CacheHits);
        stats.add(Counters::StaleEntries, 3);
        assert_eq!(stats.get(Counters::CacheHits), 2);
        assert_eq!(stats.get(Counters::StaleEntries), 3);
        assert_eq!(stats.get(Counters::CoversTried), 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let stats = Statistics::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        stats.increment(Counters::CoversTried);
                    }
                });
            }
        });
        assert_eq!(stats.get(Counters::CoversTried), 400);
    }
}
