//! Redis backend implementation

mod backend;
mod config;

pub use backend::{RedisPool, RedisStore};
pub use config::RedisConfig;
