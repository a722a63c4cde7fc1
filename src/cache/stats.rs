//! Cache Statistics Module
//!
//! Tracks session cache hits, misses, writes and swallowed failures.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how the session cache has been used.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live payload
    pub hits: u64,
    /// Reads that found nothing usable (absent, expired or corrupt)
    pub misses: u64,
    /// Entries dropped on read because they had expired
    pub expired: u64,
    /// Successful writes
    pub writes: u64,
    /// Writes abandoned because encoding or the store failed
    pub failed_writes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// An expired read counts as a miss too.
    pub fn record_expired(&mut self) {
        self.expired += 1;
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_failed_write(&mut self) {
        self.failed_writes += 1;
    }
}
