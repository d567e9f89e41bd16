//! Document store seam.
//!
//! Repositories talk to persistence only through [`DocumentStore`]: collections of
//! JSON documents addressed by id, equality filters, a single sort key, and an
//! atomic read-modify-write primitive. [`SeaOrmStore`] is the SQLite backend.

/// SQLite backend
pub mod sea_orm_store;

pub use sea_orm_store::SeaOrmStore;

use crate::{errors::Result, models::Record};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Id within the collection
    pub id: String,
    /// JSON body
    pub data: Value,
}

impl Document {
    /// Decodes the body into a record and stamps it with the document id.
    pub fn into_record<T: Record>(self) -> Result<T> {
        let mut record: T = serde_json::from_value(self.data)?;
        record.set_id(self.id);
        Ok(record)
    }
}

/// Sort order of a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Equality filters plus an optional single-field sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order_by: Option<(String, SortDirection)>,
}

impl Query {
    /// A query matching every document, unsorted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps documents whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Sorts by `field`, replacing any earlier sort.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// True when every equality filter holds for `data`.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }

    /// Filters and sorts `documents` in place. The sort is stable, so documents
    /// with equal keys keep their stored order.
    pub fn apply(&self, documents: &mut Vec<Document>) {
        documents.retain(|doc| self.matches(&doc.data));
        if let Some((field, direction)) = &self.order_by {
            documents.sort_by(|a, b| {
                let ordering = compare_values(a.data.get(field), b.data.get(field));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
    }
}

/// Orders missing < null < bool < number < string; arrays and objects compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    const fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::Array(_) | Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Read-modify-write step run inside [`DocumentStore::run_transaction`].
/// Returning an error aborts the transaction without writing.
pub type Mutation = Box<dyn FnOnce(&mut Value) -> Result<()> + Send>;

/// Wraps a typed closure as a [`Mutation`] over the record's JSON body.
pub fn record_mutation<T, F>(mutate: F) -> Mutation
where
    T: Record,
    F: FnOnce(&mut T) -> Result<()> + Send + 'static,
{
    Box::new(move |data: &mut Value| {
        let mut record: T = serde_json::from_value(data.take())?;
        mutate(&mut record)?;
        *data = serde_json::to_value(&record)?;
        Ok(())
    })
}

/// Capabilities the repositories need from a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns the store-assigned id.
    async fn insert(&self, collection: &str, data: Value) -> Result<String>;

    /// Creates or fully replaces the document with the given id.
    async fn upsert(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Returns every document in `collection` matching `query`, in query order.
    async fn get(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// The document with `id`, or `None`.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Overwrites the given top-level fields of an existing document.
    /// Fails with `DocumentNotFound` if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()>;

    /// Atomically reads the document, applies `mutation` and writes it back.
    /// Calls on the same document are linearised. Returns the written body.
    async fn run_transaction(
        &self,
        collection: &str,
        id: &str,
        mutation: Mutation,
    ) -> Result<Value>;
}
