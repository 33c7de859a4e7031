//! cacher-core: the cache contract and the types shared by its backends
//!
//! This crate defines [`Cacher`], the keys and payloads it moves, the
//! batch-read destinations, serialization and the error type. Storage lives
//! in `cacher-storage`; driver selection lives in `cacher`.

mod error;
mod traits;
mod types;

pub use error::{CacheError, Result};
pub use traits::*;
pub use types::*;
