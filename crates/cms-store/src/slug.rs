// ABOUTME: Slug resolver that makes a candidate slug unique within a collection by probing the store.
// ABOUTME: Probing is not a reservation; the unique index on slug catches anything that races past it.

use std::sync::Arc;

use cms_core::Filter;
use cms_core::document::ID_FIELD;
use cms_core::slug::suffixed;

use crate::store::{DocumentStore, StoreError};

/// Finds a free slug in a collection by appending `-2`, `-3`, ... on collision.
#[derive(Clone)]
pub struct SlugResolver {
    store: Arc<dyn DocumentStore>,
}

impl SlugResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Return `base_slug` or the first free suffixed variant of it. The
    /// record whose application id is `exclude_id` is ignored, so a record
    /// never collides with its own slug.
    pub async fn ensure_unique(
        &self,
        collection: &str,
        base_slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<String, StoreError> {
        let mut attempt = 1;
        loop {
            let candidate = suffixed(base_slug, attempt);
            let mut filter = Filter::by_slug(&candidate);
            if let Some(id) = exclude_id {
                filter = filter.ne(ID_FIELD, id);
            }

            if self.store.find_one(collection, &filter).await?.is_none() {
                tracing::debug!(collection, slug = %candidate, attempt, "resolved unique slug");
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}
