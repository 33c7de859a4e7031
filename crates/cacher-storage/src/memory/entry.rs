//! Stored form of an in-process entry

use std::time::Duration;
use tokio::time::Instant;

/// Serialized value plus its absolute expiry
#[derive(Debug, Clone)]
pub(crate) struct MemoryEntry {
    pub(crate) value: Vec<u8>,
    /// `None` for counters created by `incr` and never given a TTL, and for
    /// TTLs reaching past the clock's range
    pub(crate) expires_at: Option<Instant>,
}

impl MemoryEntry {
    pub(crate) fn with_ttl(value: Vec<u8>, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: deadline(now, ttl),
        }
    }

    pub(crate) fn persistent(value: Vec<u8>) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// An entry is dead from its expiry instant onwards
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

/// Absolute expiry for `ttl` from `now`; a TTL too long to represent never expires
pub(crate) fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    now.checked_add(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expiry_boundary_is_inclusive() {
        let now = Instant::now();
        let entry = MemoryEntry::with_ttl(b"1".to_vec(), now, Duration::from_secs(5));

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::from_millis(4999)));
        assert!(entry.is_expired_at(now + Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_never_expires() {
        let entry = MemoryEntry::persistent(b"1".to_vec());
        assert!(!entry.is_expired_at(Instant::now() + Duration::from_secs(86400 * 365)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_ttl_never_expires() {
        let now = Instant::now();
        let entry = MemoryEntry::with_ttl(b"1".to_vec(), now, Duration::MAX);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(now + Duration::from_secs(86400 * 365 * 100)));
    }
}
