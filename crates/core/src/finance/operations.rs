//! Validation of finance requests.
//!
//! Pure functions run before any request touches the store.

use super::error::FinanceError;
use super::requests::{
    AccountPatch, BudgetPatch, CategoryPatch, GoalPatch, NewAccount, NewBudget, NewCategory,
    NewGoal, NewNotification, NewTransaction, NotificationPatch, TransactionPatch,
};

/// Checks a request before it is persisted.
pub trait Validate {
    fn validate(&self) -> Result<(), FinanceError>;
}

fn require(field: &'static str, value: &str) -> Result<(), FinanceError> {
    if value.trim().is_empty() {
        return Err(FinanceError::MissingField(field));
    }
    Ok(())
}

fn finite(field: &'static str, value: f64) -> Result<(), FinanceError> {
    if !value.is_finite() {
        return Err(FinanceError::NegativeAmount(field));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), FinanceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FinanceError::NegativeAmount(field));
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), FinanceError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FinanceError::NonPositiveAmount(field));
    }
    Ok(())
}

fn optional(
    field: &'static str,
    value: Option<f64>,
    check: fn(&'static str, f64) -> Result<(), FinanceError>,
) -> Result<(), FinanceError> {
    value.map_or(Ok(()), |value| check(field, value))
}

impl Validate for NewAccount {
    fn validate(&self) -> Result<(), FinanceError> {
        require("user_id", &self.user_id)?;
        require("name", &self.name)?;
        require("currency", &self.currency)?;
        // Credit accounts carry negative balances.
        finite("balance", self.balance)
    }
}

impl Validate for NewBudget {
    fn validate(&self) -> Result<(), FinanceError> {
        require("user_id", &self.user_id)?;
        require("category_id", &self.category_id)?;
        non_negative("amount", self.amount)?;
        if self.start_date > self.end_date {
            return Err(FinanceError::InvalidDateRange);
        }
        Ok(())
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), FinanceError> {
        require("user_id", &self.user_id)?;
        require("name", &self.name)
    }
}

impl Validate for NewGoal {
    fn validate(&self) -> Result<(), FinanceError> {
        require("user_id", &self.user_id)?;
        require("name", &self.name)?;
        positive("target_amount", self.target_amount)?;
        non_negative("current_amount", self.current_amount)
    }
}

impl Validate for NewNotification {
    fn validate(&self) -> Result<(), FinanceError> {
        require("user_id", &self.user_id)?;
        require("message", &self.message)
    }
}

impl Validate for NewTransaction {
    fn validate(&self) -> Result<(), FinanceError> {
        require("user_id", &self.user_id)?;
        require("account_id", &self.account_id)?;
        require("category_id", &self.category_id)?;
        positive("amount", self.amount)
    }
}

impl Validate for AccountPatch {
    fn validate(&self) -> Result<(), FinanceError> {
        optional("balance", self.balance, finite)
    }
}

impl Validate for BudgetPatch {
    fn validate(&self) -> Result<(), FinanceError> {
        optional("amount", self.amount, non_negative)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(FinanceError::InvalidDateRange);
            }
        }
        Ok(())
    }
}

impl Validate for CategoryPatch {
    fn validate(&self) -> Result<(), FinanceError> {
        Ok(())
    }
}

impl Validate for GoalPatch {
    fn validate(&self) -> Result<(), FinanceError> {
        optional("target_amount", self.target_amount, non_negative)?;
        optional("current_amount", self.current_amount, non_negative)
    }
}

impl Validate for NotificationPatch {
    fn validate(&self) -> Result<(), FinanceError> {
        Ok(())
    }
}

impl Validate for TransactionPatch {
    fn validate(&self) -> Result<(), FinanceError> {
        optional("amount", self.amount, non_negative)
    }
}
