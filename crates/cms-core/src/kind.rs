// ABOUTME: Defines RecordKind, the closed set of content collections the CMS manages.
// ABOUTME: Each kind knows its collection name, counter name, and human-readable id format.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of records stored by the CMS. Each kind lives in its own
/// collection and draws ids from its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Itinerary,
    Travelogue,
    TripPlan,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Itinerary,
        RecordKind::Travelogue,
        RecordKind::TripPlan,
    ];

    /// Name of the document collection holding records of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Itinerary => "itineraries",
            RecordKind::Travelogue => "travelogues",
            RecordKind::TripPlan => "trip_plans",
        }
    }

    /// Name of the counter record that feeds ids for this kind.
    pub fn sequence_name(&self) -> &'static str {
        match self {
            RecordKind::Itinerary => "itineraries_seq",
            RecordKind::Travelogue => "travelogues_seq",
            RecordKind::TripPlan => "trip_plans_seq",
        }
    }

    /// Prefix placed in front of the zero-padded sequence value.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RecordKind::Itinerary => "itinerary_",
            RecordKind::Travelogue => "tl-",
            RecordKind::TripPlan => "tp-",
        }
    }

    /// Render an allocated sequence value as an application id. Values are
    /// padded to three digits and grow past that width once they exceed 999.
    pub fn format_id(&self, value: u64) -> String {
        format!("{}{:03}", self.id_prefix(), value)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Itinerary => "itinerary",
            RecordKind::Travelogue => "travelogue",
            RecordKind::TripPlan => "trip plan",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_id_pads_to_three_digits() {
        assert_eq!(RecordKind::Itinerary.format_id(3), "itinerary_003");
        assert_eq!(RecordKind::Travelogue.format_id(7), "tl-007");
        assert_eq!(RecordKind::TripPlan.format_id(42), "tp-042");
    }

    #[test]
    fn format_id_grows_past_999() {
        assert_eq!(RecordKind::Itinerary.format_id(999), "itinerary_999");
        assert_eq!(RecordKind::Itinerary.format_id(1000), "itinerary_1000");
        assert_eq!(RecordKind::Travelogue.format_id(12345), "tl-12345");
    }

    #[test]
    fn kinds_use_distinct_collections_and_counters() {
        let collections: std::collections::HashSet<_> =
            RecordKind::ALL.iter().map(|k| k.collection()).collect();
        let counters: std::collections::HashSet<_> =
            RecordKind::ALL.iter().map(|k| k.sequence_name()).collect();
        assert_eq!(collections.len(), RecordKind::ALL.len());
        assert_eq!(counters.len(), RecordKind::ALL.len());
    }
}
