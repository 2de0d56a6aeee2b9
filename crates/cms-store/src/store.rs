// ABOUTME: Defines the DocumentStore trait every storage backend implements, and StoreError.
// ABOUTME: The trait covers equality-filtered point queries, full scans, single-document writes, and counters.

use async_trait::async_trait;
use cms_core::document::{Document, ID_FIELD, SLUG_FIELD};
use cms_core::{Filter, Patch};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or did not answer in time. The
    /// operation had no effect.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate {field} in collection {collection}")]
    Conflict { collection: String, field: String },

    #[error("invalid field name: {0:?}")]
    InvalidField(String),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True when this error is a uniqueness violation on `field`.
    pub fn is_conflict_on(&self, field: &str) -> bool {
        matches!(self, StoreError::Conflict { field: f, .. } if f == field)
    }
}

/// A document database holding named collections of JSON documents plus a
/// set of named counters.
///
/// Every backend stores the assigned internal identity in the `_id` field of
/// the document and keeps `id` and `slug` unique per collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document (in insertion order) matching `filter`.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Every document in the collection, in insertion order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Insert a document and return the internal identity assigned to it.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Apply `patch` to the first document matching `filter`. Returns the
    /// number of documents matched (0 or 1).
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, StoreError>;

    /// Delete the first document matching `filter`. Returns the number of
    /// documents removed (0 or 1).
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Atomically add one to the named counter, creating it at 1 when it does
    /// not exist, and return the new value.
    async fn increment_counter(&self, sequence_name: &str) -> Result<u64, StoreError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Fields that carry a per-collection uniqueness constraint.
pub(crate) const UNIQUE_FIELDS: [&str; 2] = [ID_FIELD, SLUG_FIELD];

/// The value a unique field is indexed under. Only string values take part
/// in uniqueness; a missing or non-string value is never a conflict.
pub(crate) fn unique_key<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(|v| v.as_str())
}
