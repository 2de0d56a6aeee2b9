// ABOUTME: Sequence allocator producing gapless, strictly increasing values from named store counters.
// ABOUTME: Formatting into human-readable ids (itinerary_003, tl-007) is the caller's concern via RecordKind.

use std::sync::Arc;

use cms_core::RecordKind;

use crate::store::{DocumentStore, StoreError};

/// Hands out sequence values using the store's atomic increment.
#[derive(Clone)]
pub struct SequenceAllocator {
    store: Arc<dyn DocumentStore>,
}

impl SequenceAllocator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Increment `sequence_name` and return the new value. The first call
    /// for a name returns 1. Failures are returned as-is; no value is
    /// guessed.
    pub async fn allocate(&self, sequence_name: &str) -> Result<u64, StoreError> {
        let value = self.store.increment_counter(sequence_name).await?;
        tracing::debug!(sequence = sequence_name, value, "allocated sequence value");
        Ok(value)
    }

    /// Allocate the next application id for `kind`.
    pub async fn next_id(&self, kind: RecordKind) -> Result<String, StoreError> {
        let value = self.allocate(kind.sequence_name()).await?;
        Ok(kind.format_id(value))
    }
}
