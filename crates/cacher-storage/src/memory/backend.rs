//! In-process cache backend using DashMap

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use cacher_core::{
    ensure_ttl, BatchDest, CacheError, CacheStats, Cacher, Data, JsonSerializer, Key, Result,
    Serializer,
};

use super::entry::{deadline, MemoryEntry};

/// Internal statistics tracking
#[derive(Debug, Default)]
struct MemoryStats {
    hits: u64,
    misses: u64,
    expirations: u64,
    writes: u64,
    deletes: u64,
}

/// Outcome of looking a key up under its shard lock
enum Lookup<R> {
    Missing,
    Expired,
    Live(R),
}

/// In-process cache backend
///
/// Entries live in a sharded map; every operation holds the shard lock of
/// its key for the whole read-check-write sequence, which makes `set_nx`,
/// `incr` and the evict-on-expiry step of `get` atomic per key. Expired
/// entries are only removed when a read touches them.
///
/// Values are stored serialized, so readers always get their own copy and a
/// type mismatch surfaces as a deserialization error.
///
/// Cloning creates a new handle to the SAME underlying store.
#[derive(Clone)]
pub struct MemoryStore<S = JsonSerializer> {
    data: Arc<DashMap<Key, MemoryEntry>>,
    stats: Arc<RwLock<MemoryStats>>,
    serializer: S,
}

impl MemoryStore<JsonSerializer> {
    /// Create an empty store using JSON encoding
    pub fn new() -> Self {
        Self::with_serializer(JsonSerializer)
    }
}

impl Default for MemoryStore<JsonSerializer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Serializer> MemoryStore<S> {
    /// Create an empty store with a custom serializer
    pub fn with_serializer(serializer: S) -> Self {
        debug!(target: "cacher", serializer = serializer.name(), "memory store created");
        Self {
            data: Arc::new(DashMap::new()),
            stats: Arc::new(RwLock::new(MemoryStats::default())),
            serializer,
        }
    }

    /// Number of stored entries, counting expired ones not yet read
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Snapshot of the counters kept by this store
    pub fn stats(&self) -> CacheStats {
        let stats = self.stats.read();
        CacheStats {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            writes: stats.writes,
            deletes: stats.deletes,
            size: self.data.len(),
        }
    }

    /// Look a key up, evicting it if its TTL has lapsed
    fn lookup<R>(&self, key: &Key, now: Instant, read: impl FnOnce(&MemoryEntry) -> R) -> Lookup<R> {
        let lookup = match self.data.entry(key.clone()) {
            Entry::Vacant(_) => Lookup::Missing,
            Entry::Occupied(occ) if occ.get().is_expired_at(now) => {
                occ.remove();
                Lookup::Expired
            }
            Entry::Occupied(occ) => Lookup::Live(read(occ.get())),
        };

        let mut stats = self.stats.write();
        match lookup {
            Lookup::Missing => stats.misses += 1,
            Lookup::Expired => {
                stats.misses += 1;
                stats.expirations += 1;
                debug!(target: "cacher", key = %key, "evicted expired entry");
            }
            Lookup::Live(_) => stats.hits += 1,
        }
        lookup
    }

    fn store(&self, key: Key, value: Vec<u8>, ttl: Duration) {
        self.data
            .insert(key, MemoryEntry::with_ttl(value, Instant::now(), ttl));
        self.stats.write().writes += 1;
    }
}

#[async_trait]
impl<S: Serializer> Cacher for MemoryStore<S> {
    async fn set<V>(&self, data: &Data<V>, ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        let ttl = ensure_ttl(ttl)?;
        let raw = self.serializer.serialize(&data.value)?;
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        trace!(target: "cacher", key = %data.key, ttl_ms, "memory set");
        self.store(data.key.clone(), raw, ttl);
        Ok(())
    }

    async fn get<V>(&self, key: &Key) -> Result<V>
    where
        V: DeserializeOwned + Send,
    {
        // copy the bytes under the lock, decode outside it
        match self.lookup(key, Instant::now(), |entry| entry.value.clone()) {
            Lookup::Missing => Err(CacheError::NotFound(key.to_string())),
            Lookup::Expired => Err(CacheError::Expired(key.to_string())),
            Lookup::Live(raw) => self.serializer.deserialize(&raw),
        }
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        if self.data.remove(key).is_some() {
            self.stats.write().deletes += 1;
            trace!(target: "cacher", key = %key, "memory delete");
        }
        Ok(())
    }

    async fn batch_set<V>(&self, datas: &[Data<V>], ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        let ttl = ensure_ttl(ttl)?;
        let encoded = datas
            .iter()
            .map(|data| Ok((data.key.clone(), self.serializer.serialize(&data.value)?)))
            .collect::<Result<Vec<_>>>()?;

        trace!(target: "cacher", count = encoded.len(), "memory batch set");
        // one lock acquisition per entry, the batch as a whole is not atomic
        for (key, raw) in encoded {
            self.store(key, raw, ttl);
        }
        Ok(())
    }

    async fn batch_get<V>(&self, keys: &[Key], dest: BatchDest<'_, V>) -> Result<()>
    where
        V: DeserializeOwned + Send,
    {
        let now = Instant::now();
        trace!(target: "cacher", count = keys.len(), dest = dest.kind(), "memory batch get");

        match dest {
            BatchDest::Presence(found) => {
                for key in keys {
                    if let Lookup::Live(()) = self.lookup(key, now, |_| ()) {
                        found.insert(key.clone());
                    }
                }
            }
            BatchDest::Ordered(out) => {
                let parts: Vec<Option<Vec<u8>>> = keys
                    .iter()
                    .map(|key| match self.lookup(key, now, |entry| entry.value.clone()) {
                        Lookup::Live(raw) => Some(raw),
                        Lookup::Missing | Lookup::Expired => None,
                    })
                    .collect();

                let decoded = self.serializer.deserialize_sequence(&parts)?;
                out.clear();
                out.extend(decoded);
            }
        }
        Ok(())
    }

    async fn set_nx<V>(&self, data: &Data<V>, ttl: Duration) -> Result<bool>
    where
        V: Serialize + Send + Sync,
    {
        let ttl = ensure_ttl(ttl)?;
        let raw = self.serializer.serialize(&data.value)?;
        let now = Instant::now();

        let created = match self.data.entry(data.key.clone()) {
            Entry::Occupied(mut occ) => {
                if occ.get().is_expired_at(now) {
                    occ.insert(MemoryEntry::with_ttl(raw, now, ttl));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(MemoryEntry::with_ttl(raw, now, ttl));
                true
            }
        };

        if created {
            self.stats.write().writes += 1;
        }
        trace!(target: "cacher", key = %data.key, created, "memory set_nx");
        Ok(created)
    }

    async fn incr(&self, key: &Key) -> Result<i64> {
        let now = Instant::now();

        let next = match self.data.entry(key.clone()) {
            Entry::Occupied(mut occ) if !occ.get().is_expired_at(now) => {
                let current: i64 = self
                    .serializer
                    .deserialize(&occ.get().value)
                    .map_err(|_| CacheError::NotAnInteger(key.to_string()))?;
                let next = current.checked_add(1).ok_or_else(|| {
                    CacheError::Backend(format!("increment would overflow: {}", key))
                })?;
                // the existing TTL is kept
                occ.get_mut().value = self.serializer.serialize(&next)?;
                next
            }
            Entry::Occupied(mut occ) => {
                occ.insert(MemoryEntry::persistent(self.serializer.serialize(&1i64)?));
                1
            }
            Entry::Vacant(vacant) => {
                vacant.insert(MemoryEntry::persistent(self.serializer.serialize(&1i64)?));
                1
            }
        };

        self.stats.write().writes += 1;
        trace!(target: "cacher", key = %key, value = next, "memory incr");
        Ok(next)
    }

    async fn expire(&self, key: &Key, ttl: Duration) -> Result<bool> {
        let ttl = ensure_ttl(ttl)?;
        let now = Instant::now();

        let applied = match self.data.entry(key.clone()) {
            Entry::Occupied(occ) if occ.get().is_expired_at(now) => {
                occ.remove();
                false
            }
            Entry::Occupied(mut occ) => {
                occ.get_mut().expires_at = deadline(now, ttl);
                true
            }
            Entry::Vacant(_) => false,
        };

        trace!(target: "cacher", key = %key, applied, "memory expire");
        Ok(applied)
    }
}
