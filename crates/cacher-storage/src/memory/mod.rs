//! In-process cache backend

mod backend;
mod entry;

pub use backend::MemoryStore;
