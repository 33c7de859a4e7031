use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use parking_lot::RwLock;
use redis::{AsyncCommands, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use cacher_core::{
    ensure_ttl, BatchDest, CacheError, CacheStats, Cacher, Data, JsonSerializer, Key, Result,
    Serializer,
};

use super::config::RedisConfig;

/// Connection pool used by [`RedisStore`]
pub type RedisPool = Pool<RedisConnectionManager>;

#[derive(Debug, Default)]
struct RedisStats {
    hits: u64,
    misses: u64,
    writes: u64,
    deletes: u64,
}

/// Redis backend implementation
///
/// Single-key operations map onto one Redis command each. Batches are sent
/// as one non-transactional pipeline: a failing batch may have been applied
/// partially. Atomicity of `set_nx` and `incr` comes from the server.
#[derive(Clone)]
pub struct RedisStore<S = JsonSerializer> {
    pool: RedisPool,
    config: RedisConfig,
    stats: Arc<RwLock<RedisStats>>,
    serializer: S,
}

impl RedisStore<JsonSerializer> {
    /// Create a new Redis store using JSON encoding
    pub async fn new(config: RedisConfig) -> Result<Self> {
        Self::with_serializer(config, JsonSerializer).await
    }
}

impl<S: Serializer> RedisStore<S> {
    /// Create a new Redis store with a custom serializer
    ///
    /// The URL is parsed before the pool is built; connections are opened
    /// lazily on first use.
    pub async fn with_serializer(config: RedisConfig, serializer: S) -> Result<Self> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|e| CacheError::InvalidConfig(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        debug!(
            target: "cacher",
            url = %config.redacted_url(),
            pool_size = config.pool_size,
            serializer = serializer.name(),
            "redis store created"
        );

        Ok(Self {
            pool,
            config,
            stats: Arc::new(RwLock::new(RedisStats::default())),
            serializer,
        })
    }

    /// Underlying connection pool, for commands outside the cache contract
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    /// Configuration this store was built from
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Snapshot of the counters kept by this handle and its clones
    pub fn stats(&self) -> CacheStats {
        let stats = self.stats.read();
        CacheStats {
            hits: stats.hits,
            misses: stats.misses,
            expirations: 0,
            writes: stats.writes,
            deletes: stats.deletes,
            size: 0,
        }
    }

    /// Get connection from pool
    async fn get_connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool.get().await.map_err(|e| {
            warn!(target: "cacher", error = %e, "redis connection checkout failed");
            CacheError::Connection(e.to_string())
        })
    }

    /// Serialize every value before anything is sent
    fn encode_all<V: Serialize>(&self, datas: &[Data<V>]) -> Result<Vec<(String, Vec<u8>)>> {
        datas
            .iter()
            .map(|data| {
                Ok((
                    data.key.as_str().to_string(),
                    self.serializer.serialize(&data.value)?,
                ))
            })
            .collect()
    }
}

/// Redis TTLs are whole milliseconds; anything shorter rounds up to one
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn backend_error(op: &'static str, err: RedisError) -> CacheError {
    warn!(target: "cacher", op, error = %err, "redis command failed");
    CacheError::Backend(err.to_string())
}

#[async_trait]
impl<S: Serializer> Cacher for RedisStore<S> {
    async fn set<V>(&self, data: &Data<V>, ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        let ms = ttl_millis(ensure_ttl(ttl)?);
        let raw = self.serializer.serialize(&data.value)?;

        let mut conn = self.get_connection().await?;
        let _: () = conn
            .pset_ex(data.key.as_str(), raw, ms)
            .await
            .map_err(|e| backend_error("set", e))?;

        self.stats.write().writes += 1;
        trace!(target: "cacher", key = %data.key, ttl_ms = ms, "redis set");
        Ok(())
    }

    async fn get<V>(&self, key: &Key) -> Result<V>
    where
        V: DeserializeOwned + Send,
    {
        let mut conn = self.get_connection().await?;
        let raw: Option<Vec<u8>> = conn
            .get(key.as_str())
            .await
            .map_err(|e| backend_error("get", e))?;
        drop(conn);

        match raw {
            Some(raw) => {
                self.stats.write().hits += 1;
                self.serializer.deserialize(&raw)
            }
            None => {
                self.stats.write().misses += 1;
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let removed: u64 = conn
            .del(key.as_str())
            .await
            .map_err(|e| backend_error("delete", e))?;

        self.stats.write().deletes += removed;
        trace!(target: "cacher", key = %key, removed, "redis delete");
        Ok(())
    }

    async fn batch_set<V>(&self, datas: &[Data<V>], ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        let ms = ttl_millis(ensure_ttl(ttl)?);
        // a serialization failure aborts before any command is queued
        let encoded = self.encode_all(datas)?;
        if encoded.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for (key, raw) in &encoded {
            pipe.pset_ex(key, raw, ms).ignore();
        }

        let mut conn = self.get_connection().await?;
        let _: () = pipe
            .query_async(&mut *conn)
            .await
            .map_err(|e| backend_error("batch_set", e))?;

        self.stats.write().writes += encoded.len() as u64;
        trace!(target: "cacher", count = encoded.len(), ttl_ms = ms, "redis batch set");
        Ok(())
    }

    async fn batch_get<V>(&self, keys: &[Key], dest: BatchDest<'_, V>) -> Result<()>
    where
        V: DeserializeOwned + Send,
    {
        trace!(target: "cacher", count = keys.len(), dest = dest.kind(), "redis batch get");

        match dest {
            BatchDest::Presence(found) => {
                if keys.is_empty() {
                    return Ok(());
                }

                // existence only: no payload crosses the wire
                let mut pipe = redis::pipe();
                for key in keys {
                    pipe.exists(key.as_str());
                }

                let mut conn = self.get_connection().await?;
                let present: Vec<bool> = pipe
                    .query_async(&mut *conn)
                    .await
                    .map_err(|e| backend_error("batch_get", e))?;
                drop(conn);

                let mut stats = self.stats.write();
                for (key, exists) in keys.iter().zip(present) {
                    if exists {
                        stats.hits += 1;
                        found.insert(key.clone());
                    } else {
                        stats.misses += 1;
                    }
                }
            }
            BatchDest::Ordered(out) => {
                if keys.is_empty() {
                    out.clear();
                    return Ok(());
                }

                let mut pipe = redis::pipe();
                for key in keys {
                    pipe.get(key.as_str());
                }

                let mut conn = self.get_connection().await?;
                // nil replies are misses, not failures
                let parts: Vec<Option<Vec<u8>>> = pipe
                    .query_async(&mut *conn)
                    .await
                    .map_err(|e| backend_error("batch_get", e))?;
                drop(conn);

                {
                    let hits = parts.iter().filter(|p| p.is_some()).count() as u64;
                    let mut stats = self.stats.write();
                    stats.hits += hits;
                    stats.misses += parts.len() as u64 - hits;
                }

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
        let ms = ttl_millis(ensure_ttl(ttl)?);
        let raw = self.serializer.serialize(&data.value)?;

        let mut conn = self.get_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(data.key.as_str())
            .arg(raw)
            .arg("NX")
            .arg("PX")
            .arg(ms)
            .query_async(&mut *conn)
            .await
            .map_err(|e| backend_error("set_nx", e))?;

        let created = reply.is_some();
        if created {
            self.stats.write().writes += 1;
        }
        trace!(target: "cacher", key = %data.key, created, "redis set_nx");
        Ok(created)
    }

    async fn incr(&self, key: &Key) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        let value: i64 = conn
            .incr(key.as_str(), 1i64)
            .await
            .map_err(|e| backend_error("incr", e))?;

        self.stats.write().writes += 1;
        trace!(target: "cacher", key = %key, value, "redis incr");
        Ok(value)
    }

    async fn expire(&self, key: &Key, ttl: Duration) -> Result<bool> {
        let ms = ttl_millis(ensure_ttl(ttl)?);
        let ms = i64::try_from(ms).unwrap_or(i64::MAX);

        let mut conn = self.get_connection().await?;
        let applied: bool = conn
            .pexpire(key.as_str(), ms)
            .await
            .map_err(|e| backend_error("expire", e))?;

        trace!(target: "cacher", key = %key, applied, "redis expire");
        Ok(applied)
    }
}
