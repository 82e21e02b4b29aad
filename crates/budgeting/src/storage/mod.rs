//! Storage backend implementations.
//!
//! This module provides concrete [`DocumentStore`] implementations, the typed
//! [`DocumentRepository`] over any store, and the cache-aside decorator.
//! The store is selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): documents held in process memory
//! - `sqlite`: SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time (enforced in `state`).
//!
//! [`DocumentStore`]: budgeting_core::storage::DocumentStore

pub mod cached;
mod document;

#[cfg(any(feature = "sqlite", test))]
mod unavailable;

#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cached::CachedRepository;
pub use document::DocumentRepository;

#[cfg(any(feature = "sqlite", test))]
pub use unavailable::UnavailableStore;

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
