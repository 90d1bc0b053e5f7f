//! Cache Statistics Module
//!
//! Tracks cache behavior counters: hits, misses, rejected commits, and
//! purged entries.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing a store's observed behavior.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing live and synthesized the schema default
    pub misses: u64,
    /// Commit-mode writes the durability layer refused
    pub rejected_commits: u64,
    /// Entries removed by background purges
    pub expired_purged: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the rejected-commit counter.
    pub fn record_rejected_commit(&mut self) {
        self.rejected_commits += 1;
    }

    /// Adds purged entries to the purge counter.
    pub fn record_purged(&mut self, count: u64) {
        self.expired_purged += count;
    }

    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    // == Report ==
    /// Produces a timestamped, serializable snapshot of the counters.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            hits: self.hits,
            misses: self.misses,
            rejected_commits: self.rejected_commits,
            expired_purged: self.expired_purged,
            total_entries: self.total_entries,
            hit_rate: self.hit_rate(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// == Stats Report ==
/// Point-in-time view of the counters, for logging or export.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub hits: u64,
    pub misses: u64,
    pub rejected_commits: u64,
    pub expired_purged: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
    /// Timestamp in ISO 8601 format
    pub generated_at: String,
}
