//! Core traits for cache operations

mod cacher;
mod serializer;

pub use cacher::Cacher;
pub use serializer::{JsonSerializer, Serializer};

#[cfg(feature = "msgpack")]
pub use serializer::MsgPackSerializer;

#[cfg(feature = "bincode")]
pub use serializer::BincodeSerializer;
