// ABOUTME: Sparse partial-update type distinguishing "set", "clear", and "leave unchanged".
// ABOUTME: Converts HTTP JSON bodies into patches and applies them as shallow field replacement.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::document::{Document, ID_FIELD, INTERNAL_ID_FIELD, SLUG_FIELD, TITLE_FIELD};

/// Reserved body key listing fields to remove from the stored document.
pub const UNSET_KEY: &str = "$unset";

/// Errors raised while reading a patch out of a JSON body.
#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("update body must be a JSON object")]
    NotAnObject,

    #[error("\"$unset\" must be an array of field names")]
    InvalidUnset,

    #[error("\"id\" can only be replaced by a non-empty string, never removed")]
    InvalidId,
}

/// A replacement application id must be a non-empty string.
fn is_valid_id(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

/// What happens to one top-level field. Fields that do not appear in a
/// patch are left unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Set(Value),
    Clear,
}

/// A sparse set of top-level field changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    changes: BTreeMap<String, FieldChange>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a patch from a request body.
    ///
    /// Non-null values become `Set`, `null` values are dropped (the stored
    /// value is kept), and every name listed under `"$unset"` becomes
    /// `Clear`. A field named in `"$unset"` is cleared even if the body also
    /// sets it. The internal identity can never be patched, and `id` may only
    /// be renamed to a non-empty string.
    pub fn from_json(body: Value) -> Result<Self, PatchError> {
        let Value::Object(fields) = body else {
            return Err(PatchError::NotAnObject);
        };

        let mut patch = Patch::new();
        let mut unset = Vec::new();

        for (field, value) in fields {
            if field == UNSET_KEY {
                let Value::Array(names) = value else {
                    return Err(PatchError::InvalidUnset);
                };
                for name in names {
                    match name {
                        Value::String(name) if name == ID_FIELD => {
                            return Err(PatchError::InvalidId);
                        }
                        Value::String(name) => unset.push(name),
                        _ => return Err(PatchError::InvalidUnset),
                    }
                }
                continue;
            }
            if value.is_null() {
                continue;
            }
            if field == ID_FIELD && !is_valid_id(&value) {
                return Err(PatchError::InvalidId);
            }
            patch.set(&field, value);
        }

        for field in unset {
            patch.clear(&field);
        }

        Ok(patch)
    }

    /// Record a new value for `field`. Changes to `_id`, and `id` values
    /// that are not non-empty strings, are ignored.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if field == INTERNAL_ID_FIELD || (field == ID_FIELD && !is_valid_id(&value)) {
            return self;
        }
        self.changes.insert(field.to_string(), FieldChange::Set(value));
        self
    }

    /// Record that `field` should be removed. `_id` and `id` cannot be
    /// removed.
    pub fn clear(&mut self, field: &str) -> &mut Self {
        if field != INTERNAL_ID_FIELD && field != ID_FIELD {
            self.changes.insert(field.to_string(), FieldChange::Clear);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    /// The value being set for `field`, if any.
    pub fn set_value(&self, field: &str) -> Option<&Value> {
        match self.changes.get(field) {
            Some(FieldChange::Set(value)) => Some(value),
            _ => None,
        }
    }

    /// The new title, when the patch sets a non-empty string title.
    pub fn new_title(&self) -> Option<&str> {
        self.set_value(TITLE_FIELD)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }

    /// True when the caller supplied a non-empty slug of their own.
    pub fn has_explicit_slug(&self) -> bool {
        self.set_value(SLUG_FIELD)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Shallow-merge this patch into `doc`: set fields are replaced
    /// wholesale, cleared fields are removed.
    pub fn apply(&self, doc: &mut Document) {
        for (field, change) in &self.changes {
            match change {
                FieldChange::Set(value) => {
                    doc.insert(field.clone(), value.clone());
                }
                FieldChange::Clear => {
                    doc.remove(field);
                }
            }
        }
    }
}
