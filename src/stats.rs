// Copyright 2025 Cowboy AI, LLC.

//! Cache counters

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::ops::Add;

/// Counters for one cache or, summed, for one scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// `wrap` calls answered from the table
    pub hits: u64,
    /// `wrap` calls that built a new composite
    pub misses: u64,
    /// Entries dropped by pruning
    pub pruned: u64,
    /// Pruning passes over the table
    pub sweeps: u64,
    /// Epochs started
    pub epochs: u64,
}

impl CacheStats {
    /// Share of `wrap` calls answered from the table
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl Add for CacheStats {
    type Output = CacheStats;

    fn add(self, rhs: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits + rhs.hits,
            misses: self.misses + rhs.misses,
            pruned: self.pruned + rhs.pruned,
            sweeps: self.sweeps + rhs.sweeps,
            epochs: self.epochs + rhs.epochs,
        }
    }
}

/// Interior-mutable counters kept by a cache
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: Cell<u64>,
    misses: Cell<u64>,
    pruned: Cell<u64>,
    sweeps: Cell<u64>,
}

impl StatsRecorder {
    pub(crate) fn hit(&self) {
        self.hits.set(self.hits.get() + 1);
    }

    pub(crate) fn miss(&self) {
        self.misses.set(self.misses.get() + 1);
    }

    pub(crate) fn swept(&self, pruned: usize) {
        self.sweeps.set(self.sweeps.get() + 1);
        self.pruned.set(self.pruned.get() + pruned as u64);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            pruned: self.pruned.get(),
            sweeps: self.sweeps.get(),
            epochs: 0,
        }
    }
}
