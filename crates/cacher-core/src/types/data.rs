//! Write payloads and batch-read destinations

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use super::key::Key;
use crate::{CacheError, Result};

/// A key/value pair handed to a write operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data<V> {
    pub key: Key,
    pub value: V,
}

impl<V> Data<V> {
    pub fn new(key: impl Into<Key>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Where `batch_get` writes its results, and how it decodes them
///
/// The variant picks the strategy. `Presence` only answers which keys exist
/// and never decodes payloads. `Ordered` decodes every payload and keeps
/// positional correspondence with the requested keys, leaving `None` where a
/// key was absent.
#[derive(Debug)]
pub enum BatchDest<'a, V> {
    /// Receives every requested key that currently has a live entry
    Presence(&'a mut HashSet<Key>),
    /// Cleared, then filled with exactly one element per requested key
    Ordered(&'a mut Vec<Option<V>>),
}

impl<'a, V> BatchDest<'a, V> {
    /// Short name used in log events
    pub fn kind(&self) -> &'static str {
        match self {
            BatchDest::Presence(_) => "presence",
            BatchDest::Ordered(_) => "ordered",
        }
    }
}

impl<'a> BatchDest<'a, ()> {
    /// Presence destination without naming a payload type
    pub fn presence(set: &'a mut HashSet<Key>) -> Self {
        BatchDest::Presence(set)
    }
}

/// Reject TTLs that would make an entry expire on write
pub fn ensure_ttl(ttl: Duration) -> Result<Duration> {
    if ttl.is_zero() {
        return Err(CacheError::InvalidTtl);
    }
    Ok(ttl)
}
