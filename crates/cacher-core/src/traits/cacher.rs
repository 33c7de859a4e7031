//! The cache contract shared by every backend

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::{BatchDest, Data, Key, Result};

/// Cache contract implemented by the in-process and Redis backends
///
/// Callers depend on this trait rather than a concrete store. Every write
/// takes an explicit, non-zero TTL. Expiry is observed lazily: nothing runs
/// in the background.
///
/// Rate limiters build on [`incr`](Cacher::incr) and
/// [`expire`](Cacher::expire); deduplication of notifications builds on
/// [`set_nx`](Cacher::set_nx):
///
/// ```rust,ignore
/// async fn allow<C: Cacher>(cache: &C, client: &str, limit: i64) -> Result<bool> {
///     let key = Key::from_parts(["ratelimit", client]);
///     let hits = cache.incr(&key).await?;
///     if hits == 1 {
///         cache.expire(&key, Duration::from_secs(60)).await?;
///     }
///     Ok(hits <= limit)
/// }
///
/// async fn should_notify<C: Cacher>(cache: &C, fingerprint: &str) -> Result<bool> {
///     let data = Data::new(Key::from_parts(["notify", fingerprint]), true);
///     cache.set_nx(&data, Duration::from_secs(300)).await
/// }
/// ```
#[async_trait]
pub trait Cacher: Send + Sync {
    /// Unconditional upsert; replaces any existing value and TTL
    async fn set<V>(&self, data: &Data<V>, ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync;

    /// Read one entry
    ///
    /// Fails with `NotFound` when there is no live entry, `Expired` when the
    /// in-process backend finds a lapsed entry (evicting it, so the next read
    /// reports `NotFound`), or `Deserialization` when `V` does not match the
    /// stored shape.
    async fn get<V>(&self, key: &Key) -> Result<V>
    where
        V: DeserializeOwned + Send;

    /// Remove an entry; removing an absent key is not an error
    async fn delete(&self, key: &Key) -> Result<()>;

    /// Write several entries with one shared TTL
    ///
    /// Not atomic: on failure, callers must not assume which of the writes
    /// persisted.
    async fn batch_set<V>(&self, datas: &[Data<V>], ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync;

    /// Read several keys; `dest` selects the decode strategy
    ///
    /// A missing key never fails the batch. Any other backend failure does.
    async fn batch_get<V>(&self, keys: &[Key], dest: BatchDest<'_, V>) -> Result<()>
    where
        V: DeserializeOwned + Send;

    /// Set only if no live entry exists; `true` if this call created it
    async fn set_nx<V>(&self, data: &Data<V>, ttl: Duration) -> Result<bool>
    where
        V: Serialize + Send + Sync;

    /// Atomically increment a counter, creating it at 1 when absent
    async fn incr(&self, key: &Key) -> Result<i64>;

    /// (Re)assign the TTL of a live entry; `false` if there is none
    async fn expire(&self, key: &Key, ttl: Duration) -> Result<bool>;
}
