// ABOUTME: Trip plan model: a traveller's request for a custom itinerary and its review workflow state.
// ABOUTME: Person references such as assigned_to are soft links; nothing checks them against other records.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    New,
    UnderReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_trips: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialRequirements {
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: Url,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMeta {
    pub review_deadline: DateTime<Utc>,
    pub escalation_threshold: String,
    pub sla_hours: u32,
}

/// A traveller's request for a tailored trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    /// Application id such as `tp-001`; allocated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_request_type", rename = "type")]
    pub request_type: String,
    /// Trip plans are untitled unless an editor names them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub requester: Person,

    pub destinations: Vec<String>,
    pub categories: Vec<String>,

    /// e.g. `{"days": 7, "nights": 6}`
    pub duration: BTreeMap<String, u32>,
    pub preferred_dates: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub budget: Budget,
    pub group_size: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<SpecialRequirements>,

    pub priority_level: PriorityLevel,
    #[serde(default)]
    pub tags: Vec<String>,

    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub timeline: Timeline,
    pub workflow_meta: WorkflowMeta,
}

fn default_request_type() -> String {
    "itinerary_request".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_request_with_defaults() {
        let plan: TripPlan = serde_json::from_value(json!({
            "requester": { "id": "u-17", "name": "Ravi" },
            "destinations": ["Leh"],
            "categories": ["road trip"],
            "duration": { "days": 7, "nights": 6 },
            "preferred_dates": { "from_date": "2025-06-01", "to_date": "2025-06-07" },
            "budget": { "min": 40000.0, "max": 60000.0, "currency": "INR" },
            "group_size": 3,
            "priority_level": "high",
            "status": "new",
            "timeline": { "submitted_at": "2025-03-01T10:00:00Z" },
            "workflow_meta": {
                "review_deadline": "2025-03-03T10:00:00Z",
                "escalation_threshold": "24h",
                "sla_hours": 48
            }
        }))
        .unwrap();

        assert_eq!(plan.request_type, "itinerary_request");
        assert_eq!(plan.duration["days"], 7);
        assert_eq!(plan.priority_level, PriorityLevel::High);
        assert!(plan.title.is_none());
        assert!(plan.tags.is_empty());

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["type"], "itinerary_request");
        assert_eq!(value["preferred_dates"]["from_date"], "2025-06-01");
    }

    #[test]
    fn rejects_unknown_status() {
        let result = serde_json::from_value::<RequestStatus>(json!("pending"));
        assert!(result.is_err());
    }
}
