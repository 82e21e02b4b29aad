//! Typed repository over any [`DocumentStore`].

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use budgeting_core::finance::Record;
use budgeting_core::storage::{
    decode, encode, Document, DocumentStore, Filter, ObjectId, Patch, Query, Repository, Result,
    UpdateOutcome, CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Persists records of type `T` in the collection `T::COLLECTION`.
///
/// Every stored document is decoded back into `T` before it leaves the
/// repository, so callers never see raw documents.
pub struct DocumentRepository<T, S: ?Sized> {
    store: Arc<S>,
    _record: PhantomData<fn() -> T>,
}

impl<T, S: ?Sized> DocumentRepository<T, S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T, S> Repository<T> for DocumentRepository<T, S>
where
    T: Record,
    S: DocumentStore + ?Sized + 'static,
{
    async fn create(&self, draft: &T::Draft) -> Result<T> {
        let mut document = encode(draft)?;
        let id = ObjectId::new();
        let now = timestamp(Utc::now());

        document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
        document.insert(CREATED_AT_FIELD.to_string(), now.clone());
        document.insert(UPDATED_AT_FIELD.to_string(), now);
        document.insert(DELETED_AT_FIELD.to_string(), Value::Null);

        self.store
            .insert_one(T::COLLECTION, document.clone())
            .await?;

        tracing::debug!(collection = T::COLLECTION, id = %id, "Record created");
        decode(document)
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<T>> {
        self.store
            .find_one(T::COLLECTION, &Filter::by_id(id))
            .await?
            .map(decode)
            .transpose()
    }

    async fn list(&self, query: &T::Query) -> Result<Vec<T>> {
        let filter = query.filter().active();
        self.store
            .find(T::COLLECTION, &filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn update(&self, id: &ObjectId, patch: &T::Patch) -> Result<UpdateOutcome<T>> {
        let mut set = patch.changes();
        if set.is_empty() {
            tracing::debug!(collection = T::COLLECTION, id = %id, "No fields to update");
            return Ok(UpdateOutcome::NoChanges);
        }
        set.insert(UPDATED_AT_FIELD.to_string(), timestamp(Utc::now()));

        let filter = Filter::by_id(id).active();
        match self
            .store
            .find_one_and_update(T::COLLECTION, &filter, set)
            .await?
        {
            Some(document) => Ok(UpdateOutcome::Updated(decode(document)?)),
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<()> {
        let mut set = Document::new();
        set.insert(DELETED_AT_FIELD.to_string(), timestamp(Utc::now()));

        // Already-deleted records do not match, so the first timestamp wins.
        let matched = self
            .store
            .update_one(T::COLLECTION, &Filter::by_id(id).active(), set)
            .await?;

        tracing::debug!(collection = T::COLLECTION, id = %id, matched, "Record soft deleted");
        Ok(())
    }
}
