// ABOUTME: Process-local DocumentStore backed by hash maps behind a single async mutex.
// ABOUTME: Enforces the same id/slug uniqueness as the SQLite backend; used for dev runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use cms_core::document::{Document, INTERNAL_ID_FIELD};
use cms_core::{Filter, Patch};
use serde_json::Value;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::store::{DocumentStore, StoreError, UNIQUE_FIELDS, unique_key};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    counters: HashMap<String, u64>,
}

/// An in-memory document store. All state is lost when it is dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject `candidate` if another document (other than the one at `skip`)
/// already holds one of its unique values.
fn check_unique(
    collection: &str,
    docs: &[Document],
    candidate: &Document,
    skip: Option<usize>,
) -> Result<(), StoreError> {
    for field in UNIQUE_FIELDS {
        let Some(key) = unique_key(candidate, field) else {
            continue;
        };
        let taken = docs
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, doc)| unique_key(doc, field) == Some(key));
        if taken {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, StoreError> {
        let internal_id = Ulid::new().to_string();
        document.insert(
            INTERNAL_ID_FIELD.to_string(),
            Value::String(internal_id.clone()),
        );

        let mut inner = self.inner.lock().await;
        let docs = inner.collections.entry(collection.to_string()).or_default();
        check_unique(collection, docs, &document, None)?;
        docs.push(document);

        Ok(internal_id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(index) = docs.iter().position(|doc| filter.matches(doc)) else {
            return Ok(0);
        };

        let mut updated = docs[index].clone();
        patch.apply(&mut updated);
        check_unique(collection, docs, &updated, Some(index))?;
        docs[index] = updated;

        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn increment_counter(&self, sequence_name: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let value = inner
            .counters
            .entry(sequence_name.to_string())
            .or_insert(0);
        *value += 1;
        Ok(*value)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
