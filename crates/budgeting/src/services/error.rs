use thiserror::Error;

use budgeting_core::finance::FinanceError;
use budgeting_core::storage::RepositoryError;

/// Failure of a domain handler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// The request failed validation before reaching the store.
    #[error("Invalid request: {0}")]
    Invalid(#[from] FinanceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Invalid(_) => 400,
            ServiceError::Repository(err) => {
                budgeting_core::storage::repository_error_to_status_code(err)
            }
        }
    }
}
