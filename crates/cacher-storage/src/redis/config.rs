//! Configuration for the Redis backend

use std::fmt;
use std::time::Duration;

/// Connection settings for [`RedisStore`](super::RedisStore)
#[derive(Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379/0")
    pub url: String,

    /// Connection pool size
    pub pool_size: u32,

    /// How long a command waits for a pooled connection
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            pool_size: 10,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Create new config with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Build the URL from a host address, a password and a database index
    ///
    /// `host` is usually `host:port`; a `redis://` or `rediss://` scheme is
    /// kept if present. An empty password means no authentication; any other
    /// password is percent-encoded, so reserved characters survive.
    pub fn from_parts(host: &str, password: &str, database: i64) -> Self {
        let (scheme, address) = host.split_once("://").unwrap_or(("redis", host));
        let address = address.trim_end_matches('/');
        let auth = if password.is_empty() {
            String::new()
        } else {
            format!(":{}@", urlencoding::encode(password))
        };
        Self::new(format!("{}://{}{}/{}", scheme, auth, address, database))
    }

    /// Set pool size
    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Set connection checkout timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// URL with any password masked, for logs
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.rsplit_once('@') {
            Some((userinfo, address)) => {
                let user = userinfo.split_once(':').map_or(userinfo, |(user, _)| user);
                format!("{}://{}:***@{}", scheme, user, address)
            }
            None => self.url.clone(),
        }
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("url", &self.redacted_url())
            .field("pool_size", &self.pool_size)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}
