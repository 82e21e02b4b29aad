//! SQLite document store.
//!
//! Each collection is a table of JSON bodies; filters are evaluated with
//! SQLite's `json_extract`.

mod error;
mod schema;
mod store;

pub use store::SqliteStore;
