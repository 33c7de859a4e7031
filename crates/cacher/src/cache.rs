//! The backend-agnostic cache handle built by the factory

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::info;

use crate::config::{BackendPlan, CacheConfig, Driver};
use crate::{
    BatchDest, CacheStats, Cacher, Data, JsonSerializer, Key, MemoryStore, Result, Serializer,
};

#[cfg(feature = "redis")]
use crate::RedisStore;

/// A ready-to-use cache, backed by exactly one driver
///
/// Built by [`Cache::new`] from a [`CacheConfig`]. Every [`Cacher`] call is
/// forwarded to the selected backend.
///
/// ```rust,no_run
/// use cacher::prelude::*;
/// use std::time::Duration;
///
/// # async fn run() -> Result<()> {
/// let cache = Cache::new(CacheConfig::new().driver(Driver::InMemory)).await?;
/// cache.set(&Data::new("greeting", "hello"), Duration::from_secs(60)).await?;
/// let greeting: String = cache.get(&Key::from("greeting")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub enum Cache<S = JsonSerializer> {
    Memory(MemoryStore<S>),
    #[cfg(feature = "redis")]
    Redis(RedisStore<S>),
}

macro_rules! dispatch {
    ($cache:expr, $store:ident => $call:expr) => {
        match $cache {
            Cache::Memory($store) => $call,
            #[cfg(feature = "redis")]
            Cache::Redis($store) => $call,
        }
    };
}

impl Cache<JsonSerializer> {
    /// Validate `config`, then build the selected backend with JSON encoding
    ///
    /// Configuration errors are reported before any connection or map is
    /// created.
    pub async fn new(config: CacheConfig) -> Result<Self> {
        Self::with_serializer(config, JsonSerializer).await
    }
}

impl<S: Serializer> Cache<S> {
    /// Validate `config`, then build the selected backend with `serializer`
    pub async fn with_serializer(config: CacheConfig, serializer: S) -> Result<Self> {
        let cache = match config.plan()? {
            BackendPlan::Memory => Cache::Memory(MemoryStore::with_serializer(serializer)),
            #[cfg(feature = "redis")]
            BackendPlan::Redis(redis) => {
                Cache::Redis(RedisStore::with_serializer(redis, serializer).await?)
            }
        };

        info!(target: "cacher", driver = %cache.driver(), "cache ready");
        Ok(cache)
    }

    /// Driver this cache was built with
    pub fn driver(&self) -> Driver {
        match self {
            Cache::Memory(_) => Driver::InMemory,
            #[cfg(feature = "redis")]
            Cache::Redis(_) => Driver::Redis,
        }
    }

    /// The in-process store, if that is the active backend
    pub fn as_memory(&self) -> Option<&MemoryStore<S>> {
        match self {
            Cache::Memory(store) => Some(store),
            #[cfg(feature = "redis")]
            Cache::Redis(_) => None,
        }
    }

    /// The Redis store, if that is the active backend
    ///
    /// Gives access to the connection pool for commands outside [`Cacher`].
    #[cfg(feature = "redis")]
    pub fn as_redis(&self) -> Option<&RedisStore<S>> {
        match self {
            Cache::Redis(store) => Some(store),
            Cache::Memory(_) => None,
        }
    }

    /// Counters kept by the active backend
    pub fn stats(&self) -> CacheStats {
        dispatch!(self, store => store.stats())
    }
}

impl<S: Serializer> From<MemoryStore<S>> for Cache<S> {
    fn from(store: MemoryStore<S>) -> Self {
        Cache::Memory(store)
    }
}

#[cfg(feature = "redis")]
impl<S: Serializer> From<RedisStore<S>> for Cache<S> {
    fn from(store: RedisStore<S>) -> Self {
        Cache::Redis(store)
    }
}

#[async_trait]
impl<S: Serializer> Cacher for Cache<S> {
    async fn set<V>(&self, data: &Data<V>, ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        dispatch!(self, store => store.set(data, ttl).await)
    }

    async fn get<V>(&self, key: &Key) -> Result<V>
    where
        V: DeserializeOwned + Send,
    {
        dispatch!(self, store => store.get(key).await)
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        dispatch!(self, store => store.delete(key).await)
    }

    async fn batch_set<V>(&self, datas: &[Data<V>], ttl: Duration) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        dispatch!(self, store => store.batch_set(datas, ttl).await)
    }

    async fn batch_get<V>(&self, keys: &[Key], dest: BatchDest<'_, V>) -> Result<()>
    where
        V: DeserializeOwned + Send,
    {
        dispatch!(self, store => store.batch_get(keys, dest).await)
    }

    async fn set_nx<V>(&self, data: &Data<V>, ttl: Duration) -> Result<bool>
    where
        V: Serialize + Send + Sync,
    {
        dispatch!(self, store => store.set_nx(data, ttl).await)
    }

    async fn incr(&self, key: &Key) -> Result<i64> {
        dispatch!(self, store => store.incr(key).await)
    }

    async fn expire(&self, key: &Key, ttl: Duration) -> Result<bool> {
        dispatch!(self, store => store.expire(key, ttl).await)
    }
}
