use std::sync::Arc;

use budgeting_core::finance::{Notification, NotificationPatch, Record, UpdateRequest, Validate};
use budgeting_core::storage::{ObjectId, Repository, UpdateOutcome};

use super::ServiceError;

type Result<T> = std::result::Result<T, ServiceError>;

/// CRUD handler for one record type.
pub struct EntityService<T: Record> {
    repository: Arc<dyn Repository<T>>,
}

impl<T: Record> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<T: Record> EntityService<T> {
    pub fn new(repository: Arc<dyn Repository<T>>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, draft: T::Draft) -> Result<T> {
        draft.validate()?;
        let record = self.repository.create(&draft).await?;
        tracing::info!(entity = T::ENTITY, id = %record.id(), "Created record");
        Ok(record)
    }

    /// `None` when no record has this identifier.
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        let id = ObjectId::parse_str(id)?;
        Ok(self.repository.get(&id).await?)
    }

    pub async fn list(&self, query: &T::Query) -> Result<Vec<T>> {
        Ok(self.repository.list(query).await?)
    }

    pub async fn update(&self, request: UpdateRequest<T::Patch>) -> Result<UpdateOutcome<T>> {
        let id = ObjectId::parse_str(&request.id)?;
        request.patch.validate()?;

        let outcome = self.repository.update(&id, &request.patch).await?;
        tracing::info!(entity = T::ENTITY, id = %id, outcome = outcome.label(), "Update processed");
        Ok(outcome)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = ObjectId::parse_str(id)?;
        self.repository.delete(&id).await?;
        tracing::info!(entity = T::ENTITY, id = %id, "Deleted record");
        Ok(())
    }
}

impl EntityService<Notification> {
    /// Flags an active notification as read.
    pub async fn mark_as_read(&self, id: &str) -> Result<UpdateOutcome<Notification>> {
        let patch = NotificationPatch {
            is_read: Some(true),
            ..Default::default()
        };
        self.update(UpdateRequest::new(id, patch)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use budgeting_core::finance::{
        FinanceError, Goal, GoalPatch, GoalQuery, NewGoal, NewNotification,
    };
    use budgeting_core::storage::{DocumentStore, RepositoryError};

    use crate::storage::{DocumentRepository, InMemoryStore};

    /// Counts calls reaching the repository.
    struct CountingRepository {
        inner: DocumentRepository<Goal, InMemoryStore>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Repository<Goal> for CountingRepository {
        async fn create(&self, draft: &NewGoal) -> budgeting_core::storage::Result<Goal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create(draft).await
        }

        async fn get(&self, id: &ObjectId) -> budgeting_core::storage::Result<Option<Goal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(id).await
        }

        async fn list(&self, query: &GoalQuery) -> budgeting_core::storage::Result<Vec<Goal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list(query).await
        }

        async fn update(
            &self,
            id: &ObjectId,
            patch: &GoalPatch,
        ) -> budgeting_core::storage::Result<UpdateOutcome<Goal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update(id, patch).await
        }

        async fn delete(&self, id: &ObjectId) -> budgeting_core::storage::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(id).await
        }
    }

    fn goals() -> (Arc<CountingRepository>, EntityService<Goal>) {
        let repository = Arc::new(CountingRepository {
            inner: DocumentRepository::new(Arc::new(InMemoryStore::new())),
            calls: AtomicUsize::new(0),
        });
        (repository.clone(), EntityService::new(repository))
    }

    fn new_goal(target_amount: f64) -> NewGoal {
        NewGoal {
            user_id: "u1".to_string(),
            name: "Vacation".to_string(),
            target_amount,
            current_amount: 0.0,
            deadline: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            status: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_repository() {
        let (repository, service) = goals();

        let err = service.create(new_goal(0.0)).await.unwrap_err();

        assert_eq!(
            err,
            ServiceError::Invalid(FinanceError::NonPositiveAmount("target_amount"))
        );
        assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let (repository, service) = goals();

        let err = service.get("not-an-object-id").await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::InvalidId(_))
        ));
        assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let (_, service) = goals();

        let created = service.create(new_goal(1000.0)).await.unwrap();
        assert_eq!(service.get(&created.id).await.unwrap(), Some(created.clone()));

        let outcome = service
            .update(UpdateRequest::new(
                created.id.clone(),
                GoalPatch {
                    current_amount: Some(250.0),
                    ..Default::default()
                },
            ))
            .await
            .unwrap();
        assert_eq!(outcome.updated().unwrap().current_amount, 250.0);

        service.delete(&created.id).await.unwrap();
        service.delete(&created.id).await.unwrap();
        assert!(service
            .list(&GoalQuery {
                user_id: Some("u1".to_string())
            })
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_mark_as_read() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let service: EntityService<Notification> = EntityService::new(Arc::new(
            DocumentRepository::<Notification, dyn DocumentStore>::new(store),
        ));
        let created = service
            .create(NewNotification {
                user_id: "u1".to_string(),
                message: "Budget exceeded".to_string(),
                is_read: false,
            })
            .await
            .unwrap();
        assert!(!created.is_read);

        let read = service.mark_as_read(&created.id).await.unwrap();
        assert!(read.updated().unwrap().is_read);

        service.delete(&created.id).await.unwrap();
        assert_eq!(
            service.mark_as_read(&created.id).await.unwrap(),
            UpdateOutcome::NotFound
        );
    }
}
