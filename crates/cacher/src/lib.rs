//! cacher: one cache contract over an in-process map or Redis
//!
//! Application code talks to [`Cacher`]; which store sits behind it is a
//! configuration decision made once, when the [`Cache`] is built.
//!
//! # Features
//!
//! - **In-process backend** with lazy, read-time TTL expiry
//! - **Redis backend** with pipelined batch reads and writes (`redis`, on by default)
//! - **Atomic primitives** (`set_nx`, `incr`, `expire`) for rate limiting and deduplication
//! - **Pluggable serialization** (JSON by default, `msgpack`, `bincode`)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cacher::prelude::*;
//! use std::collections::HashSet;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let cache = Cache::new(CacheConfig::from_env()?).await?;
//!     let ttl = Duration::from_secs(60);
//!
//!     cache.set(&Data::new("user:1", "alice"), ttl).await?;
//!     let name: String = cache.get(&Key::from("user:1")).await?;
//!     println!("Got: {}", name);
//!
//!     let mut present = HashSet::new();
//!     let keys = [Key::from("user:1"), Key::from("user:2")];
//!     cache.batch_get(&keys, BatchDest::presence(&mut present)).await?;
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod config;

// Re-export core
pub use cacher_core::*;

// Re-export storage
pub use cacher_storage::MemoryStore;

#[cfg(feature = "redis")]
pub use cacher_storage::{RedisConfig, RedisPool, RedisStore};

pub use cache::Cache;
pub use config::{CacheConfig, Driver};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BatchDest, Cache, CacheConfig, CacheError, Cacher, Data, Driver, JsonSerializer, Key,
        MemoryStore, Result, Serializer,
    };

    #[cfg(feature = "redis")]
    pub use crate::{RedisConfig, RedisStore};

    #[cfg(feature = "msgpack")]
    pub use crate::MsgPackSerializer;

    #[cfg(feature = "bincode")]
    pub use crate::BincodeSerializer;
}

#[cfg(test)]
mod tests;
