//! Pluggable serialization trait

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Trait for pluggable serialization formats
///
/// Built-in implementations: JSON (default), MessagePack, Bincode.
pub trait Serializer: Send + Sync + Clone + 'static {
    /// Name of the serializer (for debugging/logging)
    fn name(&self) -> &str;

    /// Serialize a value to bytes
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CacheError>;

    /// Deserialize bytes to a value
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError>;

    /// Decode the raw payloads of a batch read, one element per slot
    ///
    /// `None` slots stay `None`. The default decodes each payload on its own;
    /// formats that can splice payloads into one document override this to
    /// decode once.
    fn deserialize_sequence<T: DeserializeOwned>(
        &self,
        parts: &[Option<Vec<u8>>],
    ) -> Result<Vec<Option<T>>, CacheError> {
        parts
            .iter()
            .map(|part| part.as_deref().map(|b| self.deserialize(b)).transpose())
            .collect()
    }
}

/// JSON serializer (default)
///
/// Human-readable, and what other services reading the same Redis keys
/// are most likely to understand.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }

    /// Splices every payload into a single `[a,null,c]` array and parses it once.
    fn deserialize_sequence<T: DeserializeOwned>(
        &self,
        parts: &[Option<Vec<u8>>],
    ) -> Result<Vec<Option<T>>, CacheError> {
        let capacity = parts
            .iter()
            .map(|p| p.as_ref().map_or(4, Vec::len) + 1)
            .sum::<usize>()
            + 2;
        let mut buf = Vec::with_capacity(capacity);

        buf.push(b'[');
        for (idx, part) in parts.iter().enumerate() {
            if idx > 0 {
                buf.push(b',');
            }
            match part {
                Some(raw) => buf.extend_from_slice(raw),
                None => buf.extend_from_slice(b"null"),
            }
        }
        buf.push(b']');

        let decoded: Vec<Option<T>> = self.deserialize(&buf)?;
        if decoded.len() != parts.len() {
            return Err(CacheError::Deserialization(format!(
                "expected {} batch elements, decoded {}",
                parts.len(),
                decoded.len()
            )));
        }
        Ok(decoded)
    }
}

/// MessagePack serializer (optional)
///
/// Faster and more compact than JSON, but not human-readable.
/// Enable with `msgpack` feature.
#[cfg(feature = "msgpack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSerializer;

#[cfg(feature = "msgpack")]
impl Serializer for MsgPackSerializer {
    fn name(&self) -> &str {
        "msgpack"
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        rmp_serde::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        rmp_serde::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}

/// Bincode serializer (optional)
///
/// Most compact, but not self-describing, so Redis counters written by
/// `INCR` cannot be read back through it.
/// Enable with `bincode` feature.
#[cfg(feature = "bincode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSerializer;

#[cfg(feature = "bincode")]
impl Serializer for BincodeSerializer {
    fn name(&self) -> &str {
        "bincode"
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        let (val, _len) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| CacheError::Deserialization(e.to_string()))?;
        Ok(val)
    }
}
