//! Cache statistics

/// Counters kept by a backend instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing (including expired entries)
    pub misses: u64,
    /// Entries evicted at read time because their TTL lapsed
    pub expirations: u64,
    /// Entries written (`set`, `batch_set`, successful `set_nx`, `incr`)
    pub writes: u64,
    /// Explicit deletes
    pub deletes: u64,
    /// Entries currently held, when the backend can tell cheaply
    pub size: usize,
}

impl CacheStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total reads (hits + misses)
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
