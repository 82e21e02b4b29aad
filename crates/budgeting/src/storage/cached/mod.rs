//! Cache-aside repository decorator.
//!
//! Wraps any [`Repository`] implementation with a [`Cache`], keyed by
//! `"{entity}:{id}"`.
//!
//! [`Repository`]: budgeting_core::storage::Repository
//! [`Cache`]: budgeting_core::cache::Cache

mod repository;

pub use repository::CachedRepository;
