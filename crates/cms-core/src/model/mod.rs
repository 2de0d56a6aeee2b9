// ABOUTME: Typed create-payload models for every record kind, plus shared value types.
// ABOUTME: Deserializing into these models is the schema validation step before the core sees a document.

pub mod itinerary;
pub mod travelogue;
pub mod trip_plan;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::kind::RecordKind;

pub use itinerary::Itinerary;
pub use travelogue::Travelogue;
pub use trip_plan::TripPlan;

/// A validated create payload for one record kind.
pub trait RecordModel: Serialize + DeserializeOwned + Send + 'static {
    const KIND: RecordKind;

    /// Convert into a storable document. Absent optional fields are omitted
    /// rather than written as `null`.
    fn into_document(self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(serde::ser::Error::custom(format!(
                "{} did not serialize to a JSON object",
                Self::KIND
            ))),
        }
    }
}

impl RecordModel for Itinerary {
    const KIND: RecordKind = RecordKind::Itinerary;
}

impl RecordModel for Travelogue {
    const KIND: RecordKind = RecordKind::Travelogue;
}

impl RecordModel for TripPlan {
    const KIND: RecordKind = RecordKind::TripPlan;
}

/// Point of interest within an image, as fractions of width and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}
