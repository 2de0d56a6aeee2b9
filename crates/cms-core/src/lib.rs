// ABOUTME: Core library for travel-cms, containing record kinds, content models, and write-path value types.
// ABOUTME: Nothing here touches storage; the store and server crates build on these types.

pub mod document;
pub mod kind;
pub mod model;
pub mod patch;
pub mod slug;

pub use document::{Condition, Document, Filter};
pub use kind::RecordKind;
pub use model::{Itinerary, RecordModel, Travelogue, TripPlan};
pub use patch::{FieldChange, Patch, PatchError};
pub use slug::slugify;
