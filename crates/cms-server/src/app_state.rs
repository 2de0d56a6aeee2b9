// ABOUTME: Shared application state for the travel-cms HTTP server.
// ABOUTME: Holds the RecordService every handler goes through, with constructors for prod and test use.

use std::sync::Arc;

use cms_store::{DocumentStore, MemoryStore, RecordService};

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub records: RecordService,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            records: RecordService::new(store),
        }
    }

    /// AppState backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.records.store().backend_name()
    }
}
