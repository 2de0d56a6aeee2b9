// ABOUTME: Schemaless document representation and the equality filters used to address documents.
// ABOUTME: Documents are JSON objects; filters are conjunctions of field (in)equality conditions.

use serde_json::{Map, Value};

/// A stored record: a JSON object keyed by top-level field name.
pub type Document = Map<String, Value>;

/// Field holding the store-assigned internal identity, rendered as a string.
pub const INTERNAL_ID_FIELD: &str = "_id";
/// Field holding the application-level identifier (`itinerary_001`, `tl-004`).
pub const ID_FIELD: &str = "id";
/// Field holding the collection-unique URL slug.
pub const SLUG_FIELD: &str = "slug";
/// Field the slug is derived from.
pub const TITLE_FIELD: &str = "title";

/// A single top-level field condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    Ne(String, Value),
}

impl Condition {
    /// The field this condition tests.
    pub fn field(&self) -> &str {
        match self {
            Condition::Eq(field, _) | Condition::Ne(field, _) => field,
        }
    }

    /// Evaluate against a document. A missing field compares as `null`.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq(field, value) => doc.get(field).unwrap_or(&Value::Null) == value,
            Condition::Ne(field, value) => doc.get(field).unwrap_or(&Value::Null) != value,
        }
    }
}

/// A conjunction of conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the application id.
    pub fn by_id(id: &str) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Filter on the store-assigned internal identity.
    pub fn internal_id(internal_id: &str) -> Self {
        Self::new().eq(INTERNAL_ID_FIELD, internal_id)
    }

    /// Filter on the slug.
    pub fn by_slug(slug: &str) -> Self {
        Self::new().eq(SLUG_FIELD, slug)
    }

    /// Add an equality condition.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    /// Add an inequality condition.
    pub fn ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Ne(field.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True when every condition holds for `doc`.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Read a top-level string field, treating empty strings as absent.
pub fn non_empty_str<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
