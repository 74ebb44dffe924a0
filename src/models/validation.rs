//! Field-level validation errors
//!
//! Store-side schema checks report failures per field, so callers can pick
//! out the message for the one field they render (or fall back when that
//! field is not the one that failed).

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind reported for a missing required field
pub const REQUIRED: &str = "required";

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Which check failed, e.g. `required`
    pub kind: String,
    pub message: String,
}

/// Every field that failed validation, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `required` failure using the document-store wording,
    /// e.g. ``Path `tweet` is required.``
    pub fn required(&mut self, field: &str) {
        self.add(field, REQUIRED, format!("Path `{}` is required.", field));
    }

    pub fn add(&mut self, field: &str, kind: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(
            field.to_string(),
            FieldError {
                kind: kind.into(),
                message: message.into(),
            },
        );
    }

    /// The failure recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.fields.get(field)
    }

    /// Message for `field`, if that field failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|e| e.message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.values().map(|e| e.message.as_str()).collect();
        write!(f, "validation failed: {}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
