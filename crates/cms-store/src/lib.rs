// ABOUTME: Persistence layer for travel-cms: document stores, sequence allocation, and slug resolution.
// ABOUTME: RecordService ties them together into the create/read/update/delete paths the server calls.

pub mod memory;
pub mod records;
pub mod sequence;
pub mod slug;
pub mod sqlite;
pub mod store;

pub use memory::MemoryStore;
pub use records::{MAX_SLUG_ATTEMPTS, RecordService};
pub use sequence::SequenceAllocator;
pub use slug::SlugResolver;
pub use sqlite::{DEFAULT_BUSY_TIMEOUT, SqliteStore};
pub use store::{DocumentStore, StoreError};
