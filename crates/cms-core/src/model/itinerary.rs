// ABOUTME: Itinerary content model: day-wise plans, travel logistics, insights, and route maps.
// ABOUTME: Icon, color, and status keys are closed enums so the UI can map them without guessing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{FocalPoint, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    #[default]
    Draft,
    InReview,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelIcon {
    Plane,
    Train,
    Bus,
    Car,
    Bicycle,
    Ship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelColor {
    Blue,
    Green,
    Orange,
    Purple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Info,
    Warning,
    Tip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonIcon {
    Sun,
    Rain,
    Wind,
    Snow,
}

/// Tailwind background class stored as a key; the UI maps it to a swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorColor {
    #[serde(rename = "bg-green-100")]
    Green,
    #[serde(rename = "bg-yellow-100")]
    Yellow,
    #[serde(rename = "bg-blue-100")]
    Blue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub image_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_point: Option<FocalPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// arrival, transfer, activity, temple visit, ...
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// UI icon key only (plane, car, trek, hotel, food, camera).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activitytags: Option<Vec<String>>,
    #[serde(default)]
    pub activity_images: Vec<ImageAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayImage {
    pub image_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub day_images: Vec<DayImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DoAndDonts {
    #[serde(default)]
    pub dos: Vec<String>,
    #[serde(default)]
    pub donts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelMode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub icon: TravelIcon,
    pub color: TravelColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HowToReach {
    #[serde(default)]
    pub modes: Vec<TravelMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripGalleryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub item: String,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalInsights {
    #[serde(default)]
    pub budget_planning: Vec<BudgetItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<String>,
    #[serde(default)]
    pub etiquette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTimeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// e.g. "April - June"
    pub period: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_color: Option<IndicatorColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<SeasonIcon>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BestTimeToVisit {
    #[serde(default)]
    pub entries: Vec<BestTimeEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_season: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect_for: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub order: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// stay, sight, food, activity, transport
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub stop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDay {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_stops: Option<u32>,
    /// `{ lat, lng, zoom }`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_center: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub days: Vec<RouteDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GettingAroundOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price1_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price1_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price2_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price2_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub icon: TravelIcon,
    pub color: TravelColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GettingAround {
    pub city: String,
    #[serde(default)]
    pub options: Vec<GettingAroundOption>,
}

/// A curated, day-by-day travel plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    /// Application id such as `itinerary_001`; allocated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub status: PublishStatus,

    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Derived from the title when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    pub cover_image: ImageAsset,

    pub destinations: Vec<String>,
    pub categories: Vec<String>,
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tier: Option<String>,
    #[serde(default)]
    pub best_season: Vec<String>,
    #[serde(default)]
    pub perfect_for: Vec<String>,

    #[serde(default)]
    pub daywise_plan: Vec<DayPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_and_donts: Option<DoAndDonts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_to_reach: Option<HowToReach>,
    #[serde(default)]
    pub trip_gallery: Vec<TripGalleryItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_insights: Option<LocalInsights>,
    #[serde(default)]
    pub travel_notes: Vec<TravelNote>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_to_visit: Option<BestTimeToVisit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getting_around: Option<GettingAround>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_map: Option<RouteMap>,
}

fn default_version() -> u32 {
    1
}
