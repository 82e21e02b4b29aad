//! Degraded-mode document store.

use async_trait::async_trait;

use budgeting_core::storage::{Document, DocumentStore, Filter, RepositoryError, Result};

/// Stands in for a store that could not be opened at startup.
///
/// Every call fails with [`RepositoryError::ConnectionFailed`], so the
/// server still starts, readiness reports the outage, and RPCs answer 503.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(RepositoryError::ConnectionFailed(self.reason.clone()))
    }
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn insert_one(&self, _collection: &str, _document: Document) -> Result<()> {
        self.fail()
    }

    async fn find_one(&self, _collection: &str, _filter: &Filter) -> Result<Option<Document>> {
        self.fail()
    }

    async fn find(&self, _collection: &str, _filter: &Filter) -> Result<Vec<Document>> {
        self.fail()
    }

    async fn find_one_and_update(
        &self,
        _collection: &str,
        _filter: &Filter,
        _set: Document,
    ) -> Result<Option<Document>> {
        self.fail()
    }

    async fn update_one(&self, _collection: &str, _filter: &Filter, _set: Document) -> Result<u64> {
        self.fail()
    }

    async fn ping(&self) -> Result<()> {
        self.fail()
    }
}
