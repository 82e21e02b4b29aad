//! Domain handler set.
//!
//! One service per entity, shared by the RPC surface and the event
//! consumers. Each accepts a decoded request, validates it, and returns a
//! typed response or a [`ServiceError`].

mod entity;
mod error;
mod reports;

use std::sync::Arc;
use std::time::Duration;

use budgeting_core::cache::Cache;
use budgeting_core::finance::{Account, Budget, Category, Goal, Notification, Record, Transaction};
use budgeting_core::storage::DocumentStore;

use crate::storage::{CachedRepository, DocumentRepository};

pub use entity::EntityService;
pub use error::ServiceError;
pub use reports::ReportService;

/// Every domain handler, wired to one store and one cache.
#[derive(Clone)]
pub struct Services {
    pub accounts: EntityService<Account>,
    pub budgets: EntityService<Budget>,
    pub categories: EntityService<Category>,
    pub goals: EntityService<Goal>,
    pub notifications: EntityService<Notification>,
    pub transactions: EntityService<Transaction>,
    pub reports: ReportService,
}

fn direct<T: Record>(store: &Arc<dyn DocumentStore>) -> EntityService<T> {
    EntityService::new(Arc::new(DocumentRepository::<T, dyn DocumentStore>::new(
        store.clone(),
    )))
}

fn cached<T: Record>(
    store: &Arc<dyn DocumentStore>,
    cache: &Arc<dyn Cache>,
    ttl: Duration,
) -> EntityService<T> {
    let repository = Arc::new(DocumentRepository::<T, dyn DocumentStore>::new(
        store.clone(),
    ));
    EntityService::new(Arc::new(CachedRepository::new(
        repository,
        cache.clone(),
        ttl,
    )))
}

impl Services {
    /// Accounts, budgets, categories and goals are served cache-aside;
    /// transactions and notifications always read the store.
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        let budgets = cached::<Budget>(&store, &cache, ttl);
        let goals = cached::<Goal>(&store, &cache, ttl);
        let transactions = direct::<Transaction>(&store);

        Self {
            accounts: cached(&store, &cache, ttl),
            categories: cached(&store, &cache, ttl),
            notifications: direct(&store),
            reports: ReportService::new(transactions.clone(), budgets.clone(), goals.clone()),
            budgets,
            goals,
            transactions,
        }
    }
}
