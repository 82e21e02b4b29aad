//! Message broker implementations.
//!
//! The active backend follows the cache feature flags:
//!
//! - `memory` (default): in-process queues, one per topic
//! - `redis`: reliable Redis lists (`BLMOVE` into a processing list)
//!
//! The in-memory broker is always compiled: it is the fallback when Redis
//! cannot be reached at startup.

mod memory;

#[cfg(feature = "redis")]
mod redis_impl;

pub use memory::MemoryBroker;

#[cfg(test)]
pub use memory::{Resolution, Resolved};

#[cfg(feature = "redis")]
pub use redis_impl::RedisBroker;
