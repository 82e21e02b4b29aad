use thiserror::Error;

/// Errors raised while validating finance requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FinanceError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be a finite, non-negative amount")]
    NegativeAmount(&'static str),
    #[error("{0} must be greater than zero")]
    NonPositiveAmount(&'static str),
    #[error("End date must be after or equal to start date")]
    InvalidDateRange,
}
