//! SQLite document store implementation.

use async_trait::async_trait;
use rusqlite::{params_from_iter, OptionalExtension};
use serde_json::Value;
use tokio_rusqlite::Connection;

use budgeting_core::storage::{
    apply_set, Document, DocumentStore, Filter, RepositoryError, Result, ID_FIELD,
};

use super::error::{map_tokio_rusqlite_error, wrap_err, wrap_json_err};
use super::schema;

fn parse_body(body: &str) -> std::result::Result<Document, tokio_rusqlite::Error> {
    serde_json::from_str(body).map_err(wrap_json_err)
}

/// SQLite-based document store.
///
/// Provides async access to SQLite storage; every collection is a table of
/// `(id, body)` rows where `body` is the JSON document.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        let sql = schema::create_tables();
        conn.call(move |conn| {
            conn.execute_batch(&sql).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Applies `set` to the first matching row inside one transaction and
    /// returns the post-update document.
    async fn modify_first(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<Document>> {
        let table = schema::table(collection)?;
        let (clause, params) = schema::where_clause(filter);
        let select = schema::select_first(table, &clause);
        let update = schema::update_body(table);

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;

                let row = tx
                    .query_row(&select, params_from_iter(params.iter()), |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })
                    .optional()
                    .map_err(wrap_err)?;

                let Some((id, body)) = row else {
                    return Ok(None);
                };

                let mut document = parse_body(&body)?;
                apply_set(&mut document, &set);
                let body = serde_json::to_string(&document).map_err(wrap_json_err)?;

                tx.execute(&update, rusqlite::params![id, body])
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                Ok(Some(document))
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        let table = schema::table(collection)?;
        let id = document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RepositoryError::InvalidData("document has no id".to_string()))?;
        let body = serde_json::to_string(&document)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        let sql = schema::insert(table);

        self.conn
            .call(move |conn| {
                conn.execute(&sql, rusqlite::params![id, body])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let table = schema::table(collection)?;
        let (clause, params) = schema::where_clause(filter);
        let sql = schema::select_first(table, &clause);

        self.conn
            .call(move |conn| {
                let body = conn
                    .query_row(&sql, params_from_iter(params.iter()), |row| {
                        row.get::<_, String>(1)
                    })
                    .optional()
                    .map_err(wrap_err)?;
                body.as_deref().map(parse_body).transpose()
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let table = schema::table(collection)?;
        let (clause, params) = schema::where_clause(filter);
        let sql = schema::select(table, &clause);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))
                    .map_err(wrap_err)?;

                let mut documents = Vec::new();
                for row_result in rows {
                    let body = row_result.map_err(wrap_err)?;
                    documents.push(parse_body(&body)?);
                }
                Ok(documents)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<Document>> {
        self.modify_first(collection, filter, set).await
    }

    async fn update_one(&self, collection: &str, filter: &Filter, set: Document) -> Result<u64> {
        Ok(self
            .modify_first(collection, filter, set)
            .await?
            .map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(())).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("expected an object"),
        }
    }

    async fn store() -> SqliteStore {
        SqliteStore::new_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_one() {
        let store = store().await;
        let document = doc(json!({"id": "a1", "user_id": "u1", "balance": 12.5, "deleted_at": null}));
        store.insert_one("accounts", document.clone()).await.unwrap();

        let found = store
            .find_one("accounts", &Filter::new().equals("id", "a1").active())
            .await
            .unwrap();

        assert_eq!(found, Some(document));
    }

    #[tokio::test]
    async fn test_unknown_collection_is_rejected() {
        let store = store().await;
        let err = store
            .insert_one("wallets", doc(json!({"id": "w1"})))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_insert_requires_id() {
        let store = store().await;
        let err = store
            .insert_one("accounts", doc(json!({"name": "no id"})))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_find_filters_and_keeps_insertion_order() {
        let store = store().await;
        for (id, user) in [("t1", "u1"), ("t2", "u2"), ("t3", "u1")] {
            store
                .insert_one("transactions", doc(json!({"id": id, "user_id": user, "amount": 10})))
                .await
                .unwrap();
        }

        let found = store
            .find(
                "transactions",
                &Filter::new().equals("user_id", "u1").equals("amount", 10),
            )
            .await
            .unwrap();

        let ids: Vec<_> = found.iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!("t1"), json!("t3")]);
    }

    #[tokio::test]
    async fn test_find_one_and_update_merges_fields() {
        let store = store().await;
        store
            .insert_one("budgets", doc(json!({"id": "b1", "amount": 100, "name": "Food"})))
            .await
            .unwrap();

        let updated = store
            .find_one_and_update(
                "budgets",
                &Filter::new().equals("id", "b1").active(),
                doc(json!({"amount": 150})),
            )
            .await
            .unwrap();

        assert_eq!(
            updated,
            Some(doc(json!({"id": "b1", "amount": 150, "name": "Food"})))
        );
        let stored = store
            .find_one("budgets", &Filter::new().equals("id", "b1"))
            .await
            .unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_one_skips_deleted() {
        let store = store().await;
        store
            .insert_one("goals", doc(json!({"id": "g1", "deleted_at": null})))
            .await
            .unwrap();
        let filter = Filter::new().equals("id", "g1").active();

        let first = store
            .update_one("goals", &filter, doc(json!({"deleted_at": "2024-01-01T00:00:00Z"})))
            .await
            .unwrap();
        let second = store
            .update_one("goals", &filter, doc(json!({"deleted_at": "2024-06-01T00:00:00Z"})))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 0));
        let stored = store
            .find_one("goals", &Filter::new().equals("id", "g1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["deleted_at"], json!("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_boolean_filter() {
        let store = store().await;
        store
            .insert_one("notifications", doc(json!({"id": "n1", "is_read": true})))
            .await
            .unwrap();

        let found = store
            .find("notifications", &Filter::new().equals("is_read", true))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_ping() {
        assert!(store().await.ping().await.is_ok());
    }
}
