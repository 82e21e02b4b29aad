//! Cache backend implementations.
//!
//! This module provides concrete implementations of the cache trait
//! defined in `budgeting_core::cache`. The active backend is selected at
//! compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `memory` (default): In-memory LRU cache using tokio synchronization primitives
//! - `redis`: Redis cache using the redis crate
//!
//! The in-memory cache is always compiled: it is the fallback when Redis
//! cannot be reached at startup.

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
