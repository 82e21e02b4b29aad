//! SQLite schema definitions and SQL builders.
//!
//! Pure functions and data, no I/O.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use budgeting_core::finance::COLLECTIONS;
use budgeting_core::storage::{Condition, Filter, RepositoryError, Result};

/// Returns the table for `collection`, rejecting names outside the schema.
pub fn table(collection: &str) -> Result<&'static str> {
    COLLECTIONS
        .iter()
        .copied()
        .find(|known| *known == collection)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Unknown collection: {collection}")))
}

/// SQL statements creating one table per collection.
pub fn create_tables() -> String {
    COLLECTIONS
        .iter()
        .map(|table| {
            format!("CREATE TABLE IF NOT EXISTS {table} (id TEXT PRIMARY KEY, body TEXT NOT NULL);\n")
        })
        .collect()
}

/// Converts a JSON scalar to the SQL value `json_extract` would return for it.
fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn json_path(field: &str) -> SqlValue {
    SqlValue::Text(format!("$.\"{field}\""))
}

/// Builds the `WHERE` clause and its bound parameters for a filter.
///
/// Field names are bound as JSON paths, never spliced into the SQL.
pub fn where_clause(filter: &Filter) -> (String, Vec<SqlValue>) {
    if filter.is_empty() {
        return ("1 = 1".to_string(), Vec::new());
    }

    let mut clauses = Vec::with_capacity(filter.conditions().len());
    let mut params = Vec::new();

    for (field, condition) in filter.conditions() {
        match condition {
            Condition::Equals(Value::Null) | Condition::Missing => {
                clauses.push("json_extract(body, ?) IS NULL");
                params.push(json_path(field));
            }
            Condition::Equals(value) => {
                clauses.push("json_extract(body, ?) = ?");
                params.push(json_path(field));
                params.push(to_sql(value));
            }
        }
    }

    (clauses.join(" AND "), params)
}

pub fn select(table: &str, where_clause: &str) -> String {
    format!("SELECT body FROM {table} WHERE {where_clause} ORDER BY rowid")
}

pub fn select_first(table: &str, where_clause: &str) -> String {
    format!("SELECT id, body FROM {table} WHERE {where_clause} ORDER BY rowid LIMIT 1")
}

pub fn insert(table: &str) -> String {
    format!("INSERT INTO {table} (id, body) VALUES (?1, ?2)")
}

pub fn update_body(table: &str) -> String {
    format!("UPDATE {table} SET body = ?2 WHERE id = ?1")
}
