//! Driver selection and factory configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{CacheError, Result};

#[cfg(feature = "redis")]
use crate::RedisConfig;

/// Backend behind a [`Cache`](crate::Cache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Driver {
    /// Process-local map; nothing leaves the process
    #[serde(rename = "inMemory")]
    InMemory,
    /// Remote Redis server
    #[serde(rename = "redis")]
    Redis,
}

impl Driver {
    /// Name used in configuration files and environment variables
    pub const fn as_str(&self) -> &'static str {
        match self {
            Driver::InMemory => "inMemory",
            Driver::Redis => "redis",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("inMemory") => Ok(Driver::InMemory),
            s if s.eq_ignore_ascii_case("redis") => Ok(Driver::Redis),
            _ => Err(CacheError::DriverUnavailable),
        }
    }
}

/// Configuration handed to [`Cache::new`](crate::Cache::new)
///
/// Only `driver` is needed for the in-process backend. The Redis backend
/// also reads `host`, `password` and `database`; `database` is kept as text
/// so it can come straight from an environment variable, and must parse as
/// an integer.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Selected backend; construction fails when unset
    pub driver: Option<Driver>,
    /// Redis address, `host:port` or a full `redis://` URL without path
    pub host: String,
    /// Redis password; empty means no authentication
    pub password: String,
    /// Redis database index
    pub database: String,
    /// Redis connection pool size
    pub pool_size: u32,
    /// How long a Redis command waits for a pooled connection, in milliseconds
    pub connection_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            driver: None,
            host: "127.0.0.1:6379".to_string(),
            password: String::new(),
            database: "0".to_string(),
            pool_size: 10,
            connection_timeout_ms: 5_000,
        }
    }
}

/// What [`CacheConfig::plan`] decided to build
pub(crate) enum BackendPlan {
    Memory,
    #[cfg(feature = "redis")]
    Redis(RedisConfig),
}

impl CacheConfig {
    /// Create an empty configuration (no driver selected)
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `CACHE_DRIVER`, `CACHE_HOST`, `CACHE_PASSWORD` and
    /// `CACHE_DATABASE`; unset variables keep their defaults
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(driver) = var("CACHE_DRIVER") {
            config.driver = Some(driver.parse()?);
        }
        if let Some(host) = var("CACHE_HOST") {
            config.host = host;
        }
        if let Some(password) = var("CACHE_PASSWORD") {
            config.password = password;
        }
        if let Some(database) = var("CACHE_DATABASE") {
            config.database = database;
        }
        Ok(config)
    }

    /// Select the backend
    pub fn driver(mut self, driver: Driver) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Set the Redis address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the Redis password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the Redis database index
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the Redis pool size
    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the Redis connection checkout timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Check the configuration without acquiring any resource
    pub fn validate(&self) -> Result<Driver> {
        self.plan()?;
        self.driver.ok_or(CacheError::DriverUnavailable)
    }

    pub(crate) fn plan(&self) -> Result<BackendPlan> {
        match self.driver.ok_or(CacheError::DriverUnavailable)? {
            Driver::InMemory => Ok(BackendPlan::Memory),
            Driver::Redis => self.redis_plan(),
        }
    }

    #[cfg(feature = "redis")]
    fn redis_plan(&self) -> Result<BackendPlan> {
        let database = self
            .database
            .trim()
            .parse::<i64>()
            .map_err(|_| CacheError::InvalidDatabase(self.database.clone()))?;

        let host = self.host.trim();
        if host.is_empty() {
            return Err(CacheError::InvalidConfig("redis host is empty".to_string()));
        }
        if self.pool_size == 0 {
            return Err(CacheError::InvalidConfig(
                "redis pool size must be at least 1".to_string(),
            ));
        }

        let config = RedisConfig::from_parts(host, &self.password, database)
            .pool_size(self.pool_size)
            .connection_timeout(Duration::from_millis(self.connection_timeout_ms));
        Ok(BackendPlan::Redis(config))
    }

    #[cfg(not(feature = "redis"))]
    fn redis_plan(&self) -> Result<BackendPlan> {
        Err(CacheError::DriverUnavailable)
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "***" };
        f.debug_struct("CacheConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("password", &password)
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .finish()
    }
}
