//! In-memory document store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use budgeting_core::storage::{apply_set, Document, DocumentStore, Filter, Result};

/// In-memory storage backend.
///
/// Collections are vectors of documents kept in insertion order behind a
/// single `Arc<RwLock<_>>`; every mutation holds the write lock, which makes
/// it atomic per document. Data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `set` to the first matching document.
    async fn modify_first(
        &self,
        collection: &str,
        filter: &Filter,
        set: &Document,
    ) -> Option<Document> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)?
            .iter_mut()
            .find(|document| filter.matches(document))?;
        apply_set(document, set);
        Some(document.clone())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| filter.matches(document))
                .cloned()
        }))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<Document>> {
        Ok(self.modify_first(collection, filter, &set).await)
    }

    async fn update_one(&self, collection: &str, filter: &Filter, set: Document) -> Result<u64> {
        Ok(self
            .modify_first(collection, filter, &set)
            .await
            .map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_one() {
        let store = InMemoryStore::new();
        store
            .insert_one("accounts", doc(json!({"id": "a1", "user_id": "u1"})))
            .await
            .unwrap();

        let found = store
            .find_one("accounts", &Filter::new().equals("id", "a1"))
            .await
            .unwrap();
        assert_eq!(found, Some(doc(json!({"id": "a1", "user_id": "u1"}))));

        let missing = store
            .find_one("accounts", &Filter::new().equals("id", "a2"))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = InMemoryStore::new();
        store
            .insert_one("accounts", doc(json!({"id": "x"})))
            .await
            .unwrap();

        let found = store
            .find_one("budgets", &Filter::new().equals("id", "x"))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = InMemoryStore::new();
        for id in ["t1", "t2", "t3"] {
            store
                .insert_one("transactions", doc(json!({"id": id, "user_id": "u1"})))
                .await
                .unwrap();
        }
        store
            .insert_one("transactions", doc(json!({"id": "t4", "user_id": "u2"})))
            .await
            .unwrap();

        let found = store
            .find("transactions", &Filter::new().equals("user_id", "u1"))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!("t1"), json!("t2"), json!("t3")]);
    }

    #[tokio::test]
    async fn test_find_one_and_update_returns_post_image() {
        let store = InMemoryStore::new();
        store
            .insert_one("budgets", doc(json!({"id": "b1", "amount": 100})))
            .await
            .unwrap();

        let updated = store
            .find_one_and_update(
                "budgets",
                &Filter::new().equals("id", "b1"),
                doc(json!({"amount": 150})),
            )
            .await
            .unwrap();

        assert_eq!(updated, Some(doc(json!({"id": "b1", "amount": 150}))));
    }

    #[tokio::test]
    async fn test_update_one_reports_matches() {
        let store = InMemoryStore::new();
        store
            .insert_one("goals", doc(json!({"id": "g1"})))
            .await
            .unwrap();

        let filter = Filter::new().equals("id", "g1").active();
        let first = store
            .update_one("goals", &filter, doc(json!({"deleted_at": "2024-01-01T00:00:00Z"})))
            .await
            .unwrap();
        let second = store
            .update_one("goals", &filter, doc(json!({"deleted_at": "2024-02-01T00:00:00Z"})))
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }
}
