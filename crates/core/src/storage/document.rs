//! Schema-free documents, filters, and the typed decode step at the
//! persistence boundary.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{ObjectId, RepositoryError, Result};

/// A stored document: field name to JSON value.
pub type Document = serde_json::Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// A single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field is present and equal to the value.
    Equals(Value),
    /// The field is absent or null.
    Missing,
}

/// A conjunction of field predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches the document with the given identifier.
    pub fn by_id(id: &ObjectId) -> Self {
        Self::new().equals(ID_FIELD, id.to_hex())
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((field.into(), Condition::Equals(value.into())));
        self
    }

    pub fn missing(mut self, field: impl Into<String>) -> Self {
        self.conditions.push((field.into(), Condition::Missing));
        self
    }

    /// Restricts the filter to documents that were never soft deleted.
    pub fn active(self) -> Self {
        self.missing(DELETED_AT_FIELD)
    }

    /// Builds an equality filter from every nonzero field of `value`.
    pub fn from_nonzero<T: Serialize + ?Sized>(value: &T) -> Self {
        nonzero_fields(value)
            .into_iter()
            .fold(Self::new(), |filter, (field, value)| filter.equals(field, value))
    }

    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates the filter against a document.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| match condition {
                Condition::Equals(expected) => document.get(field) == Some(expected),
                Condition::Missing => document.get(field).is_none_or(Value::is_null),
            })
    }
}

/// Partial updates: only nonzero fields overwrite stored values.
pub trait Patch: Serialize + Send + Sync {
    /// The `$set`-style field map this patch applies.
    fn changes(&self) -> Document {
        nonzero_fields(self)
    }
}

/// List requests: every nonzero field becomes an equality predicate.
pub trait Query: Serialize + Send + Sync {
    fn filter(&self) -> Filter {
        Filter::from_nonzero(self)
    }
}

/// Returns true for null, empty strings, zero numbers, `false`, and empty
/// collections.
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Serializes `value` and keeps only its nonzero top-level fields.
pub fn nonzero_fields<T: Serialize + ?Sized>(value: &T) -> Document {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => fields
            .into_iter()
            .filter(|(_, value)| !is_zero(value))
            .collect(),
        _ => Document::new(),
    }
}

/// Serializes a value into a document.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(RepositoryError::InvalidData(format!(
            "expected an object, got {other}"
        ))),
        Err(err) => Err(RepositoryError::InvalidData(err.to_string())),
    }
}

/// Casts a stored document into its typed record.
///
/// Fails with a single [`RepositoryError::Decode`] when a required field is
/// missing or has the wrong shape.
pub fn decode<T: DeserializeOwned>(document: Document) -> Result<T> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| RepositoryError::Decode(err.to_string()))
}

/// Applies a `$set`-style update in place.
pub fn apply_set(document: &mut Document, set: &Document) {
    for (field, value) in set {
        document.insert(field.clone(), value.clone());
    }
}
