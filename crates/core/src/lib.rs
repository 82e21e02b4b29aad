//! Functional core for the budgeting backend.
//!
//! Pure domain types, the traits at every I/O seam (document store, cache,
//! broker), key builders and error enums. Nothing in this crate performs
//! network or disk I/O.

pub mod broker;
pub mod cache;
pub mod finance;
pub mod serde;
pub mod storage;
