//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No driver was selected, or the selected driver is not compiled in
    #[error("cache: driver unavailable")]
    DriverUnavailable,

    /// Database index could not be parsed as an integer
    #[error("cache: invalid database index: {0:?}")]
    InvalidDatabase(String),

    /// Any other malformed configuration
    #[error("cache: invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key has no live entry
    #[error("key not found: {0}")]
    NotFound(String),

    /// Entry existed but its TTL lapsed; it has been evicted
    #[error("key expired: {0}")]
    Expired(String),

    /// Writes require a non-zero TTL
    #[error("ttl must be greater than zero")]
    InvalidTtl,

    /// Counter operation on a value that is not an integer
    #[error("value is not an integer: {0}")]
    NotAnInteger(String),

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Backend connection failed
    #[error("connection error: {0}")]
    Connection(String),

    /// Backend operation failed
    #[error("backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// True for the "no live entry" outcomes of a read (`NotFound` and `Expired`)
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }

    /// True if the error was raised while validating configuration
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            CacheError::DriverUnavailable
                | CacheError::InvalidDatabase(_)
                | CacheError::InvalidConfig(_)
        )
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
