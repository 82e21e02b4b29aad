//! Redis cache backend.

mod cache;
pub(crate) mod error;

pub use cache::RedisCache;
