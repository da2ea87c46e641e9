//! Thought payloads.
//!
//! Thoughts belong to the remote API; this crate passes their JSON through
//! untouched and only reads the handful of fields it needs for summaries and
//! rendering. [`Thought`] is a borrowed, read-only view over such a payload.

use serde::Serialize;
use serde_json::{Map, Value};

/// Read-only view over a thought payload.
#[derive(Debug, Clone, Copy)]
pub struct Thought<'a> {
    payload: &'a Value,
}

impl<'a> Thought<'a> {
    /// Wraps a decoded thought payload.
    #[must_use]
    pub const fn new(payload: &'a Value) -> Self {
        Self { payload }
    }

    /// Thought id rendered as text (string ids verbatim, numbers in decimal).
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.payload.get("id").and_then(scalar_text)
    }

    /// Thought name, empty when absent.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.str_field("name").unwrap_or_default()
    }

    /// Notes, if present.
    #[must_use]
    pub fn notes(&self) -> Option<&'a str> {
        self.str_field("notes")
    }

    /// Creation timestamp, if present.
    #[must_use]
    pub fn created_at(&self) -> Option<&'a str> {
        self.str_field("created_at")
    }

    /// Modification timestamp, if present.
    #[must_use]
    pub fn modified_at(&self) -> Option<&'a str> {
        self.str_field("modified_at")
    }

    /// Links to other thoughts; empty when absent or not a list.
    #[must_use]
    pub fn links(&self) -> Vec<ThoughtLink<'a>> {
        self.payload
            .get("links")
            .and_then(Value::as_array)
            .map(|links| links.iter().map(ThoughtLink::new).collect())
            .unwrap_or_default()
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// Read-only view over one entry of a thought's `links` list.
#[derive(Debug, Clone, Copy)]
pub struct ThoughtLink<'a> {
    payload: &'a Value,
}

impl<'a> ThoughtLink<'a> {
    const fn new(payload: &'a Value) -> Self {
        Self { payload }
    }

    /// Name of the linked thought, empty when absent.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.payload
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Link type rendered as text, empty when absent.
    #[must_use]
    pub fn kind(&self) -> String {
        self.payload
            .get("type")
            .and_then(scalar_text)
            .unwrap_or_default()
    }
}

/// Body of a create request.
///
/// Unset optional fields are omitted from the serialised JSON, never sent as
/// `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewThought {
    /// Thought name.
    pub name: String,
    /// Notes content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Parent thought id.
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Additional API fields merged into the body verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewThought {
    /// Creates a request with only the name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Extracts the list of thoughts from a search response.
///
/// The API answers either with a bare array or with an object carrying the
/// list under `thoughts` or `data`. Anything else yields an empty list.
#[must_use]
pub fn search_results(results: &Value) -> &[Value] {
    match results {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("thoughts")
            .or_else(|| map.get("data"))
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
