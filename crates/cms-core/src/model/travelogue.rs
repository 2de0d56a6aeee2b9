// ABOUTME: Travelogue content model: authored long-form stories built from typed content blocks.
// ABOUTME: Content blocks form a tagged union on the "type" field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{FocalPoint, Orientation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdnVariant {
    pub quality: u32,
    pub format: String,
    pub resize: String,
    pub max_width: u32,
}

/// Fully described image; travelogue images carry layout metadata up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub image_url: Url,
    pub alt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurhash: Option<String>,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_point: Option<FocalPoint>,
    pub mime_type: String,
    pub size_bytes: u64,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_variant: Option<CdnVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub avatar: Url,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub url: Url,
    pub views: String,
    pub creator: String,
    pub thumbnail: Url,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Body,
    Intro,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub label: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelNoteItem {
    pub label: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedItinerary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub thumbnail: Url,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedTravelogue {
    pub id: String,
    pub title: String,
    pub category: String,
    pub author: String,
    pub read_time: String,
    pub rating: f64,
    pub thumbnail: ImageAsset,
}

/// One block of travelogue body content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<TextStyle>,
    },
    Image {
        image: ImageAsset,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Quote {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
    },
    Tags {
        items: Vec<String>,
    },
    Videos {
        section_title: String,
        source: String,
        videos: Vec<VideoItem>,
    },
    BudgetBreakdown {
        title: String,
        currency: String,
        categories: Vec<BudgetCategory>,
        total: i64,
        #[serde(default)]
        show_chart: bool,
    },
    Experiences {
        title: String,
        items: Vec<Value>,
    },
    Gallery {
        title: String,
        images: Vec<ImageAsset>,
    },
    JourneyRoute {
        title: String,
        stops: Vec<Value>,
    },
    TasteMemories {
        title: String,
        foods: Vec<String>,
        description: String,
    },
    TravelNotes {
        title: String,
        notes: Vec<TravelNoteItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
    },
    ClosingQuote {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    RelatedItineraries {
        title: String,
        items: Vec<RelatedItinerary>,
    },
    RelatedTravelogues {
        title: String,
        items: Vec<RelatedTravelogue>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelogueFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect_for: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// An authored travel story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Travelogue {
    /// Application id such as `tl-001`; allocated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Derived from the title when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub published_at: String,
    pub author: Author,
    pub categories: Vec<String>,
    pub destinations: Vec<String>,
    pub cover_image: ImageAsset,
    pub content_blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_keys: Option<TravelogueFilters>,
}
