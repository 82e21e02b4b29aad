use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use budgeting_core::cache::{deserialize_record, record_key, serialize_record, Cache};
use budgeting_core::finance::Record;
use budgeting_core::storage::{ObjectId, Repository, Result, UpdateOutcome};

/// Cached repository decorator.
///
/// Implements the cache-aside pattern:
/// - **Reads**: Check cache first, on miss fetch from repository and populate cache
/// - **Creates and updates**: Persist to repository, then write the new record through
/// - **Deletes**: Persist to repository, then evict
///
/// Lists always go to the repository. Cache failures are logged and never
/// fail the operation; the TTL bounds how long a missed eviction can serve
/// stale data.
///
/// # Type Parameters
///
/// * `T` - The record type
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedRepository<T, R: ?Sized, C: ?Sized> {
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
    _record: PhantomData<fn() -> T>,
}

impl<T, R: ?Sized, C: ?Sized> CachedRepository<T, R, C> {
    /// Creates a new cached repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `ttl` - Time-to-live for cached records
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
            _record: PhantomData,
        }
    }
}

impl<T, R, C> CachedRepository<T, R, C>
where
    T: Record,
    R: ?Sized,
    C: Cache + ?Sized,
{
    async fn store(&self, record: &T) {
        let cache_key = record_key(T::ENTITY, record.id());
        match serialize_record(record) {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                    tracing::warn!(key = %cache_key, error = %err, "Failed to cache record");
                }
            }
            Err(err) => {
                tracing::warn!(key = %cache_key, error = %err, "Record serialization failed");
            }
        }
    }

    async fn evict(&self, id: &ObjectId) {
        let cache_key = record_key(T::ENTITY, &id.to_hex());
        if let Err(err) = self.cache.delete(&cache_key).await {
            tracing::warn!(key = %cache_key, error = %err, "Failed to invalidate record cache");
        }
    }
}

#[async_trait]
impl<T, R, C> Repository<T> for CachedRepository<T, R, C>
where
    T: Record,
    R: Repository<T> + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn create(&self, draft: &T::Draft) -> Result<T> {
        let record = self.repository.create(draft).await?;
        self.store(&record).await;
        Ok(record)
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<T>> {
        let cache_key = record_key(T::ENTITY, &id.to_hex());

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => match deserialize_record::<T>(&bytes) {
                Ok(record) => {
                    tracing::trace!(key = %cache_key, "Cache hit");
                    return Ok(Some(record));
                }
                // Treated as a miss; the fresh read below overwrites the entry.
                Err(err) => {
                    tracing::warn!(key = %cache_key, error = %err, "Cached record deserialization failed");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key = %cache_key, error = %err, "Cache read failed");
            }
        }

        tracing::trace!(key = %cache_key, "Cache miss");
        let record = self.repository.get(id).await?;
        if let Some(ref record) = record {
            self.store(record).await;
        }
        Ok(record)
    }

    async fn list(&self, query: &T::Query) -> Result<Vec<T>> {
        self.repository.list(query).await
    }

    async fn update(&self, id: &ObjectId, patch: &T::Patch) -> Result<UpdateOutcome<T>> {
        let outcome = self.repository.update(id, patch).await?;
        match &outcome {
            UpdateOutcome::Updated(record) => self.store(record).await,
            UpdateOutcome::NotFound => self.evict(id).await,
            UpdateOutcome::NoChanges => {}
        }
        Ok(outcome)
    }

    async fn delete(&self, id: &ObjectId) -> Result<()> {
        self.repository.delete(id).await?;
        self.evict(id).await;
        Ok(())
    }
}
