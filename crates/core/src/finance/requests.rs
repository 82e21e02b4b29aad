//! Request payloads shared by the RPC surface and the event consumers.
//!
//! Pure data types with no I/O. Drafts carry the fields of a new record,
//! patches the optional fields of a partial update, queries the optional
//! fields of a list filter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::serde::{deserialize_optional_date, deserialize_optional_string, deserialize_optional_value};
use crate::storage::{Patch, Query};

use super::types::{BudgetPeriod, CategoryKind, GoalStatus, TransactionKind};

/// Addresses a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByIdRequest {
    pub id: String,
}

impl ByIdRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A partial update addressed by identifier; the patch fields sit next to
/// `id` in the payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateRequest<P> {
    pub id: String,
    #[serde(flatten)]
    pub patch: P,
}

impl<P> UpdateRequest<P> {
    pub fn new(id: impl Into<String>, patch: P) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

// ============================================================================
// Drafts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub balance: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub user_id: String,
    pub category_id: String,
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub user_id: String,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub status: GoalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: String,
    pub account_id: String,
    pub category_id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

// ============================================================================
// Patches
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_optional_string")]
    pub kind: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub currency: Option<String>,
}

impl Patch for AccountPatch {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetPatch {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_value")]
    pub period: Option<BudgetPeriod>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl Patch for BudgetPatch {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_optional_value")]
    pub kind: Option<CategoryKind>,
}

impl Patch for CategoryPatch {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalPatch {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub current_amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_value")]
    pub status: Option<GoalStatus>,
}

impl Patch for GoalPatch {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPatch {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: Option<bool>,
}

impl Patch for NotificationPatch {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_optional_value")]
    pub kind: Option<TransactionKind>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
}

impl Patch for TransactionPatch {}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
}

impl Query for AccountQuery {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category_id: Option<String>,
}

impl Query for BudgetQuery {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
}

impl Query for CategoryQuery {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
}

impl Query for GoalQuery {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
}

impl Query for NotificationQuery {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category_id: Option<String>,
}

impl Query for TransactionQuery {}

// ============================================================================
// Reports
// ============================================================================

/// Income or spending totals for a user over an inclusive date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReportRequest {
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Reports computed over every active record of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReportRequest {
    pub user_id: String,
}
