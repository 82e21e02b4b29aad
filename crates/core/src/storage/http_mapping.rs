//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! This module provides HTTP status code mappings for [`RepositoryError`] variants,
//! following the Functional Core pattern - pure functions with no side effects.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `InvalidId` -> 400 (Bad Request)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Decode` -> 500 (Internal Server Error)
/// - `InvalidData` -> 400 (Bad Request)
///
/// Not-found is never an error in this layer; handlers map an empty result
/// to 404 themselves.
///
/// # Examples
///
/// ```
/// use budgeting_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::InvalidId("abc".to_string());
/// assert_eq!(repository_error_to_status_code(&error), 400);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::InvalidId(_) => 400,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Decode(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}
