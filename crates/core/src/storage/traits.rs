use async_trait::async_trait;

use crate::finance::Record;

use super::{Document, Filter, ObjectId, Result};

/// A store of schema-free documents grouped in named collections.
///
/// Each mutating call is atomic per document; no multi-document
/// transactions are offered.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document that already carries its identifier.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()>;

    /// Returns the first document matching the filter.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Returns every document matching the filter, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Applies `set` to the first matching document and returns the
    /// post-update image.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<Document>>;

    /// Applies `set` to the first matching document and returns how many
    /// documents matched (zero or one).
    async fn update_one(&self, collection: &str, filter: &Filter, set: Document) -> Result<u64>;

    /// Verifies that the store is reachable.
    async fn ping(&self) -> Result<()>;
}

/// Result of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    /// The update was applied; carries the post-update record.
    Updated(T),
    /// No active record has this identifier.
    NotFound,
    /// The request carried no field to change.
    NoChanges,
}

impl<T> UpdateOutcome<T> {
    /// Returns the updated record, if any.
    pub fn updated(self) -> Option<T> {
        match self {
            UpdateOutcome::Updated(record) => Some(record),
            UpdateOutcome::NotFound | UpdateOutcome::NoChanges => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpdateOutcome::Updated(_) => "updated",
            UpdateOutcome::NotFound => "not_found",
            UpdateOutcome::NoChanges => "no_changes",
        }
    }
}

/// Typed persistence for one record kind.
///
/// Not-found is an empty result, never an error.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Inserts a new record, assigning its identifier and timestamps.
    async fn create(&self, draft: &T::Draft) -> Result<T>;

    /// Point lookup. Soft-deleted records are still returned.
    async fn get(&self, id: &ObjectId) -> Result<Option<T>>;

    /// Every active record matching the query's nonzero fields.
    async fn list(&self, query: &T::Query) -> Result<Vec<T>>;

    /// Merges the patch's nonzero fields into an active record.
    async fn update(&self, id: &ObjectId, patch: &T::Patch) -> Result<UpdateOutcome<T>>;

    /// Soft delete. Deleting twice keeps the first deletion time.
    async fn delete(&self, id: &ObjectId) -> Result<()>;
}
