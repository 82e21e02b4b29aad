use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::{Patch, Query};

use super::operations::Validate;
use super::requests::{
    AccountPatch, AccountQuery, BudgetPatch, BudgetQuery, CategoryPatch, CategoryQuery, GoalPatch,
    GoalQuery, NewAccount, NewBudget, NewCategory, NewGoal, NewNotification, NewTransaction,
    NotificationPatch, NotificationQuery, TransactionPatch, TransactionQuery,
};
use super::types::{Account, Budget, Category, Goal, Notification, Transaction};

/// A persisted finance record and the request shapes that act on it.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection holding these records.
    const COLLECTION: &'static str;
    /// Singular name used in logs and cache keys.
    const ENTITY: &'static str;

    type Draft: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;
    type Patch: Patch + DeserializeOwned + Validate + 'static;
    type Query: Query + DeserializeOwned + 'static;

    fn id(&self) -> &str;
}

/// Every collection the backend stores.
pub const COLLECTIONS: [&str; 6] = [
    Account::COLLECTION,
    Budget::COLLECTION,
    Category::COLLECTION,
    Goal::COLLECTION,
    Notification::COLLECTION,
    Transaction::COLLECTION,
];

macro_rules! impl_record {
    ($record:ty, $collection:literal, $entity:literal, $draft:ty, $patch:ty, $query:ty) => {
        impl Record for $record {
            const COLLECTION: &'static str = $collection;
            const ENTITY: &'static str = $entity;

            type Draft = $draft;
            type Patch = $patch;
            type Query = $query;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(Account, "accounts", "account", NewAccount, AccountPatch, AccountQuery);
impl_record!(Budget, "budgets", "budget", NewBudget, BudgetPatch, BudgetQuery);
impl_record!(Category, "categories", "category", NewCategory, CategoryPatch, CategoryQuery);
impl_record!(Goal, "goals", "goal", NewGoal, GoalPatch, GoalQuery);
impl_record!(
    Notification,
    "notifications",
    "notification",
    NewNotification,
    NotificationPatch,
    NotificationQuery
);
impl_record!(
    Transaction,
    "transactions",
    "transaction",
    NewTransaction,
    TransactionPatch,
    TransactionQuery
);
