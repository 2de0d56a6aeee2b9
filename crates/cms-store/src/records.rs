// ABOUTME: Record write orchestration: id allocation, slug derivation, and CRUD for every record kind.
// ABOUTME: Derived slugs are retried on unique-index conflicts; explicit slugs and ids are written once.

use std::sync::Arc;

use cms_core::document::{Document, ID_FIELD, INTERNAL_ID_FIELD, SLUG_FIELD, TITLE_FIELD, non_empty_str};
use cms_core::{Filter, Patch, RecordKind, slugify};
use serde_json::Value;

use crate::sequence::SequenceAllocator;
use crate::slug::SlugResolver;
use crate::store::{DocumentStore, StoreError};

/// How many times a write with a derived slug is attempted before a
/// slug conflict is reported to the caller.
pub const MAX_SLUG_ATTEMPTS: u32 = 5;

/// CRUD over record collections, assigning ids and slugs on the way in.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn DocumentStore>,
    sequences: SequenceAllocator,
    slugs: SlugResolver,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            sequences: SequenceAllocator::new(Arc::clone(&store)),
            slugs: SlugResolver::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Insert a new record.
    ///
    /// An id is allocated when the document has none. When it has no slug
    /// but has a title, a unique slug is derived from the title (falling back
    /// to the id when the title has no usable characters). The returned
    /// document carries the store's internal identity in `_id`.
    pub async fn create(&self, kind: RecordKind, mut doc: Document) -> Result<Document, StoreError> {
        let collection = kind.collection();
        doc.remove(INTERNAL_ID_FIELD);

        let id = match non_empty_str(&doc, ID_FIELD) {
            Some(id) => id.to_string(),
            None => {
                let id = self.sequences.next_id(kind).await?;
                doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let base_slug = match (non_empty_str(&doc, SLUG_FIELD), non_empty_str(&doc, TITLE_FIELD)) {
            (Some(_), _) => None,
            (None, Some(title)) => {
                let slug = slugify(title);
                Some(if slug.is_empty() { id.clone() } else { slug })
            }
            (None, None) => {
                doc.remove(SLUG_FIELD);
                None
            }
        };

        let Some(base_slug) = base_slug else {
            return self.insert(kind, doc).await;
        };

        let mut attempt = 1;
        loop {
            let slug = self.slugs.ensure_unique(collection, &base_slug, None).await?;
            doc.insert(SLUG_FIELD.to_string(), Value::String(slug.clone()));

            match self.insert(kind, doc.clone()).await {
                Err(e) if e.is_conflict_on(SLUG_FIELD) && attempt < MAX_SLUG_ATTEMPTS => {
                    tracing::warn!(collection, slug = %slug, attempt, "slug taken concurrently, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn insert(&self, kind: RecordKind, mut doc: Document) -> Result<Document, StoreError> {
        let internal_id = self.store.insert_one(kind.collection(), doc.clone()).await?;
        let id = non_empty_str(&doc, ID_FIELD).unwrap_or_default();
        tracing::info!(
            kind = %kind,
            id,
            internal_id = %internal_id,
            "record created"
        );
        doc.insert(INTERNAL_ID_FIELD.to_string(), Value::String(internal_id));
        Ok(doc)
    }

    /// Every record of `kind`, in insertion order.
    pub async fn list(&self, kind: RecordKind) -> Result<Vec<Document>, StoreError> {
        self.store.find_all(kind.collection()).await
    }

    /// The record with application id `id`, if any.
    pub async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Document>, StoreError> {
        self.store.find_one(kind.collection(), &Filter::by_id(id)).await
    }

    /// Apply a partial update to the record with application id `id`.
    ///
    /// When the patch sets a new title without an explicit slug, the slug is
    /// re-derived from the title and made unique, ignoring the record's own
    /// current slug. An empty slug in the patch clears the slug. Returns the
    /// updated record, or `None` when no record has that id.
    pub async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        mut patch: Patch,
    ) -> Result<Option<Document>, StoreError> {
        let collection = kind.collection();
        let filter = Filter::by_id(id);

        let base_slug = if patch.has_explicit_slug() {
            None
        } else {
            patch.new_title().map(slugify).filter(|s| !s.is_empty())
        };

        if base_slug.is_none() && patch.set_value(SLUG_FIELD).and_then(Value::as_str) == Some("") {
            patch.clear(SLUG_FIELD);
        }

        let matched = match base_slug {
            None => self.store.update_one(collection, &filter, &patch).await?,
            Some(base_slug) => {
                let mut attempt = 1;
                loop {
                    let slug = self.slugs.ensure_unique(collection, &base_slug, Some(id)).await?;
                    patch.set(SLUG_FIELD, slug.clone());

                    match self.store.update_one(collection, &filter, &patch).await {
                        Err(e) if e.is_conflict_on(SLUG_FIELD) && attempt < MAX_SLUG_ATTEMPTS => {
                            tracing::warn!(collection, slug = %slug, attempt, "slug taken concurrently, retrying");
                            attempt += 1;
                        }
                        result => break result?,
                    }
                }
            }
        };

        if matched == 0 {
            tracing::debug!(kind = %kind, id, "update matched no record");
            return Ok(None);
        }

        // A patch may rename the record; read it back under its new id.
        let current_id = patch
            .set_value(ID_FIELD)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(id);
        self.get(kind, current_id).await
    }

    /// Delete the record with application id `id`. Returns true when exactly
    /// one record was removed.
    pub async fn delete(&self, kind: RecordKind, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .store
            .delete_one(kind.collection(), &Filter::by_id(id))
            .await?;
        if removed == 1 {
            tracing::info!(kind = %kind, id, "record deleted");
        }
        Ok(removed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::sqlite::SqliteStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn memory_service() -> RecordService {
        RecordService::new(Arc::new(MemoryStore::new()))
    }

    /// A store whose every operation fails as if the database were down.
    struct DownStore;

    #[async_trait]
    impl DocumentStore for DownStore {
        async fn find_one(&self, _: &str, _: &Filter) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn find_all(&self, _: &str) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn insert_one(&self, _: &str, _: Document) -> Result<String, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn update_one(&self, _: &str, _: &Filter, _: &Patch) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn delete_one(&self, _: &str, _: &Filter) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn increment_counter(&self, _: &str) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    /// Wraps a store and fakes one concurrent writer stealing the first
    /// probed slug between probe and insert.
    struct RacingStore {
        inner: MemoryStore,
        raced: tokio::sync::Mutex<bool>,
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn find_one(&self, c: &str, f: &Filter) -> Result<Option<Document>, StoreError> {
            self.inner.find_one(c, f).await
        }
        async fn find_all(&self, c: &str) -> Result<Vec<Document>, StoreError> {
            self.inner.find_all(c).await
        }
        async fn insert_one(&self, c: &str, d: Document) -> Result<String, StoreError> {
            let mut raced = self.raced.lock().await;
            if !*raced {
                *raced = true;
                let mut rival = Document::new();
                rival.insert("id".to_string(), json!("rival"));
                rival.insert("slug".to_string(), d["slug"].clone());
                self.inner.insert_one(c, rival).await?;
            }
            drop(raced);
            self.inner.insert_one(c, d).await
        }
        async fn update_one(&self, c: &str, f: &Filter, p: &Patch) -> Result<u64, StoreError> {
            self.inner.update_one(c, f, p).await
        }
        async fn delete_one(&self, c: &str, f: &Filter) -> Result<u64, StoreError> {
            self.inner.delete_one(c, f).await
        }
        async fn increment_counter(&self, n: &str) -> Result<u64, StoreError> {
            self.inner.increment_counter(n).await
        }
        fn backend_name(&self) -> &'static str {
            "racing"
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_slug_from_title() {
        let service = memory_service();
        let created = service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Manali Adventure" })))
            .await
            .unwrap();

        assert_eq!(created["id"], "itinerary_001");
        assert_eq!(created["slug"], "manali-adventure");
        assert!(created["_id"].as_str().is_some_and(|s| !s.is_empty()));

        let stored = service
            .get(RecordKind::Itinerary, "itinerary_001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["slug"], "manali-adventure");
        assert_eq!(stored["_id"], created["_id"]);
    }

    #[tokio::test]
    async fn create_uses_kind_id_format() {
        let service = memory_service();
        let tl = service
            .create(RecordKind::Travelogue, doc(json!({ "title": "Spiti" })))
            .await
            .unwrap();
        let tp = service
            .create(RecordKind::TripPlan, doc(json!({ "group_size": 2 })))
            .await
            .unwrap();

        assert_eq!(tl["id"], "tl-001");
        assert_eq!(tp["id"], "tp-001");
        assert!(!tp.contains_key("slug"), "untitled records get no slug");
    }

    #[tokio::test]
    async fn create_keeps_explicit_id_and_slug() {
        let service = memory_service();
        let created = service
            .create(
                RecordKind::Itinerary,
                doc(json!({ "id": "custom-7", "title": "Goa", "slug": "Not Reformatted" })),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], "custom-7");
        assert_eq!(created["slug"], "Not Reformatted");

        // The counter was not consumed by the explicit id.
        let next = service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap();
        assert_eq!(next["id"], "itinerary_001");
        assert_eq!(next["slug"], "goa");
    }

    #[tokio::test]
    async fn create_uniquifies_repeated_titles() {
        let service = memory_service();
        let mut slugs = Vec::new();
        for _ in 0..3 {
            let created = service
                .create(RecordKind::Itinerary, doc(json!({ "title": "Kerala Backwaters" })))
                .await
                .unwrap();
            slugs.push(created["slug"].as_str().unwrap().to_string());
        }
        assert_eq!(
            slugs,
            vec!["kerala-backwaters", "kerala-backwaters-2", "kerala-backwaters-3"]
        );
    }

    #[tokio::test]
    async fn create_falls_back_to_id_for_unsluggable_title() {
        let service = memory_service();
        let created = service
            .create(RecordKind::Itinerary, doc(json!({ "title": "!!!" })))
            .await
            .unwrap();
        assert_eq!(created["slug"], "itinerary_001");
    }

    #[tokio::test]
    async fn explicit_duplicate_slug_is_rejected() {
        let service = memory_service();
        service
            .create(RecordKind::Travelogue, doc(json!({ "title": "A", "slug": "same" })))
            .await
            .unwrap();
        let err = service
            .create(RecordKind::Travelogue, doc(json!({ "title": "B", "slug": "same" })))
            .await
            .unwrap_err();
        assert!(err.is_conflict_on("slug"));
    }

    #[tokio::test]
    async fn create_retries_when_slug_is_taken_concurrently() {
        let service = RecordService::new(Arc::new(RacingStore {
            inner: MemoryStore::new(),
            raced: tokio::sync::Mutex::new(false),
        }));

        let created = service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap();
        assert_eq!(created["slug"], "goa-2");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_never_share_a_slug() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SqliteStore::open(
            &dir.path().join("cms.db"),
            crate::sqlite::DEFAULT_BUSY_TIMEOUT,
        )
        .unwrap();
        let service = RecordService::new(Arc::new(store));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create(RecordKind::Itinerary, doc(json!({ "title": "Ladakh" })))
                        .await
                })
            })
            .collect();

        let mut slugs = Vec::new();
        for result in futures::future::join_all(tasks).await {
            let created = result.unwrap().unwrap();
            slugs.push(created["slug"].as_str().unwrap().to_string());
        }
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 4, "every record gets its own slug: {:?}", slugs);
    }

    #[tokio::test]
    async fn update_title_rederives_slug_excluding_self() {
        let service = memory_service();
        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch.set("title", "Goa");
        let updated = service
            .update(RecordKind::Itinerary, "itinerary_001", patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["slug"], "goa", "a record does not collide with itself");

        let mut patch = Patch::new();
        patch.set("title", "Goa: Beaches & Nightlife!");
        let updated = service
            .update(RecordKind::Itinerary, "itinerary_001", patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["slug"], "goa-beaches-nightlife");
        assert_eq!(updated["title"], "Goa: Beaches & Nightlife!");
    }

    #[tokio::test]
    async fn update_title_avoids_other_records_slugs() {
        let service = memory_service();
        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Kerala Backwaters" })))
            .await
            .unwrap();
        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Munnar" })))
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch.set("title", "Kerala Backwaters");
        let updated = service
            .update(RecordKind::Itinerary, "itinerary_002", patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["slug"], "kerala-backwaters-2");
    }

    #[tokio::test]
    async fn update_other_fields_leaves_slug_alone() {
        let service = memory_service();
        service
            .create(
                RecordKind::Itinerary,
                doc(json!({ "title": "Manali Adventure", "duration_days": 5 })),
            )
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch.set("duration_days", 6).set("highlights", json!(["Solang"]));
        let updated = service
            .update(RecordKind::Itinerary, "itinerary_001", patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["slug"], "manali-adventure");
        assert_eq!(updated["duration_days"], 6);
        assert_eq!(updated["title"], "Manali Adventure");
    }

    #[tokio::test]
    async fn update_with_explicit_slug_keeps_it() {
        let service = memory_service();
        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch.set("title", "North Goa").set("slug", "goa-north");
        let updated = service
            .update(RecordKind::Itinerary, "itinerary_001", patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["slug"], "goa-north");
    }

    #[tokio::test]
    async fn update_missing_record_is_none() {
        let service = memory_service();
        let mut patch = Patch::new();
        patch.set("title", "Nowhere");
        let result = service
            .update(RecordKind::Travelogue, "tl-404", patch)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_with_empty_patch_returns_record() {
        let service = memory_service();
        service
            .create(RecordKind::TripPlan, doc(json!({ "group_size": 3 })))
            .await
            .unwrap();
        let updated = service
            .update(RecordKind::TripPlan, "tp-001", Patch::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["group_size"], 3);
    }

    #[tokio::test]
    async fn update_can_rename_record() {
        let service = memory_service();
        service
            .create(RecordKind::Travelogue, doc(json!({ "title": "Spiti" })))
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch.set("id", "tl-spiti");
        let updated = service
            .update(RecordKind::Travelogue, "tl-001", patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["id"], "tl-spiti");
        assert!(service.get(RecordKind::Travelogue, "tl-001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_record_reachable_by_id() {
        let service = memory_service();
        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap();

        let mut patch = Patch::new();
        patch.clear("id").set("id", 5).set("subtitle", "Beaches");
        let updated = service
            .update(RecordKind::Itinerary, "itinerary_001", patch)
            .await
            .unwrap()
            .expect("record matched, so the update result is present");
        assert_eq!(updated["id"], "itinerary_001");
        assert_eq!(updated["subtitle"], "Beaches");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let service = memory_service();
        assert!(!service.delete(RecordKind::Itinerary, "itinerary_404").await.unwrap());

        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap();
        service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Kerala" })))
            .await
            .unwrap();

        assert!(service.delete(RecordKind::Itinerary, "itinerary_001").await.unwrap());
        assert!(service.get(RecordKind::Itinerary, "itinerary_001").await.unwrap().is_none());
        assert_eq!(service.list(RecordKind::Itinerary).await.unwrap().len(), 1);
        assert!(!service.delete(RecordKind::Itinerary, "itinerary_001").await.unwrap());
    }

    #[tokio::test]
    async fn unavailable_store_fails_create_without_fallback() {
        let service = RecordService::new(Arc::new(DownStore));
        let err = service
            .create(RecordKind::Itinerary, doc(json!({ "title": "Goa" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err = service.list(RecordKind::Itinerary).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
