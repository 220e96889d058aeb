// Document Store Interface - collection/document operations over JSON documents
// Every mutation primitive here is a single statement, so preconditions and writes
// are evaluated atomically by the backing database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::DocId;
use crate::error::AppResult;

/// A document as persisted, with store-managed metadata kept outside `data`
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DocId,
    pub collection: String,
    pub data: Value,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scalar operand for filters
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<DocId> for FieldValue {
    // Ids are stored as strings inside documents
    fn from(v: DocId) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// Filter predicates; a query combines them conjunctively
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, FieldValue),
    Gte(String, f64),
    Lte(String, f64),
    /// Case-insensitive substring match on a text field
    ContainsCi(String, String),
    /// Document id is one of the given ids
    IdIn(Vec<DocId>),
    /// `count < capacity`, or no limit at all when `capacity <= 0`
    UnderCapacity { count: String, capacity: String },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<FieldValue>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn gte(field: &str, value: f64) -> Self {
        Filter::Gte(field.to_string(), value)
    }

    pub fn lte(field: &str, value: f64) -> Self {
        Filter::Lte(field.to_string(), value)
    }

    pub fn contains_ci(field: &str, needle: &str) -> Self {
        Filter::ContainsCi(field.to_string(), needle.to_string())
    }

    pub fn under_capacity(count: &str, capacity: &str) -> Self {
        Filter::UnderCapacity {
            count: count.to_string(),
            capacity: capacity.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sort {
    /// Creation time descending, id as tie-breaker
    NewestFirst,
    Field { name: String, ascending: bool },
}

#[derive(Debug, Clone)]
pub struct DocQuery {
    pub filters: Vec<Filter>,
    pub sort: Sort,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Default for DocQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: Sort::NewestFirst,
            skip: 0,
            limit: None,
        }
    }
}

impl DocQuery {
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, name: &str, ascending: bool) -> Self {
        self.sort = Sort::Field {
            name: name.to_string(),
            ascending,
        };
        self
    }

    pub fn page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

/// Field mutation applied inside a single conditional update
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Set(String, Value),
    Inc(String, i64),
    Unset(String),
}

impl Mutation {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        Mutation::Set(field.to_string(), value.into())
    }

    pub fn inc(field: &str, delta: i64) -> Self {
        Mutation::Inc(field.to_string(), delta)
    }

    pub fn unset(field: &str) -> Self {
        Mutation::Unset(field.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(StoredDocument),
    /// A unique index (or the id itself) already holds this value
    Duplicate,
}

/// Document store interface
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Declare a unique constraint on a top-level field of a collection
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> AppResult<()>;

    async fn insert(&self, collection: &str, id: DocId, data: Value) -> AppResult<InsertOutcome>;
    async fn get(&self, collection: &str, id: DocId) -> AppResult<Option<StoredDocument>>;
    async fn find(&self, collection: &str, query: &DocQuery) -> AppResult<Vec<StoredDocument>>;
    async fn count(&self, collection: &str, filters: &[Filter]) -> AppResult<u64>;

    /// Compare-and-swap on the version; `None` when the document is gone or
    /// was modified since `expected_version` was read
    async fn replace(
        &self,
        collection: &str,
        id: DocId,
        expected_version: i64,
        data: Value,
    ) -> AppResult<Option<StoredDocument>>;

    /// Apply `mutations` only if every condition still holds; `None` when
    /// nothing matched
    async fn update_where(
        &self,
        collection: &str,
        id: DocId,
        conditions: &[Filter],
        mutations: &[Mutation],
    ) -> AppResult<Option<StoredDocument>>;

    async fn delete(&self, collection: &str, id: DocId) -> AppResult<bool>;

    async fn health_check(&self) -> AppResult<()>;
}
