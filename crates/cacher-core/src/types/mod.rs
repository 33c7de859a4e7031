//! Core types for cache operations

mod data;
mod key;
mod stats;

pub use data::{ensure_ttl, BatchDest, Data};
pub use key::Key;
pub use stats::CacheStats;
