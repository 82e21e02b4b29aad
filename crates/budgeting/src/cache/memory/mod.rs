//! In-memory cache backend.

mod cache;

pub use cache::MemoryCache;
