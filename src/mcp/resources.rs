//! Thoughts exposed as MCP resources.
//!
//! A thought is addressed as `thought://thought/<id>` and read back as a
//! small markdown document.

use serde::Serialize;
use serde_json::Value;

use crate::brain::Thought;

/// URI prefix identifying a single thought.
pub const THOUGHT_URI_PREFIX: &str = "thought://thought/";

/// MIME type reported for every thought resource.
pub const THOUGHT_MIME_TYPE: &str = "text/plain";

/// Number of note characters used as a resource description.
const DESCRIPTION_CHARS: usize = 100;

/// Entry of a `resources/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Resource URI.
    pub uri: String,
    /// Thought name.
    pub name: String,
    /// Leading characters of the thought's notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Always `text/plain`.
    pub mime_type: &'static str,
}

impl ResourceDescriptor {
    /// Describes one thought payload.
    #[must_use]
    pub fn for_thought(payload: &Value) -> Self {
        let thought = Thought::new(payload);
        Self {
            uri: thought_uri(&thought.id().unwrap_or_default()),
            name: thought.name().to_string(),
            description: thought
                .notes()
                .map(|notes| notes.chars().take(DESCRIPTION_CHARS).collect()),
            mime_type: THOUGHT_MIME_TYPE,
        }
    }
}

/// Content item of a `resources/read` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// URI that was read.
    pub uri: String,
    /// Always `text/plain`.
    pub mime_type: &'static str,
    /// Rendered document.
    pub text: String,
}

/// Builds the resource URI for a thought id.
#[must_use]
pub fn thought_uri(id: &str) -> String {
    format!("{THOUGHT_URI_PREFIX}{id}")
}

/// Extracts the thought id from a thought resource URI.
///
/// Returns `None` when the URI does not use the thought prefix or ends in an
/// empty segment.
#[must_use]
pub fn parse_thought_uri(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix(THOUGHT_URI_PREFIX)?;
    rest.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Renders a thought payload as markdown.
///
/// Layout: an H1 with the name, then a "Notes" section and a "Links"
/// section when those are non-empty, then created/modified lines for
/// timestamps that are present and non-empty.
#[must_use]
pub fn render_markdown(payload: &Value) -> String {
    let thought = Thought::new(payload);
    let mut doc = format!("# {}\n\n", thought.name());

    if let Some(notes) = thought.notes().filter(|notes| !notes.is_empty()) {
        doc.push_str(&format!("## Notes\n\n{notes}\n\n"));
    }

    let links = thought.links();
    if !links.is_empty() {
        doc.push_str("## Links\n\n");
        for link in links {
            doc.push_str(&format!("- {} ({})\n", link.name(), link.kind()));
        }
        doc.push('\n');
    }

    if let Some(created) = thought.created_at().filter(|ts| !ts.is_empty()) {
        doc.push_str(&format!("**Created:** {created}\n"));
    }
    if let Some(modified) = thought.modified_at().filter(|ts| !ts.is_empty()) {
        doc.push_str(&format!("**Modified:** {modified}\n"));
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uri_round_trip() {
        assert_eq!(thought_uri("abc"), "thought://thought/abc");
        assert_eq!(parse_thought_uri("thought://thought/abc"), Some("abc"));
    }

    #[test]
    fn uri_uses_trailing_segment() {
        assert_eq!(parse_thought_uri("thought://thought/x/y"), Some("y"));
    }

    #[test]
    fn foreign_or_empty_uris_are_rejected() {
        assert_eq!(parse_thought_uri("thebrain://thought/abc"), None);
        assert_eq!(parse_thought_uri("file:///etc/passwd"), None);
        assert_eq!(parse_thought_uri("thought://thought/"), None);
        assert_eq!(parse_thought_uri(""), None);
    }

    #[test]
    fn descriptor_truncates_notes_to_100_chars() {
        let notes = "é".repeat(150);
        let descriptor = ResourceDescriptor::for_thought(&json!({
            "id": "7",
            "name": "Seven",
            "notes": notes,
        }));

        assert_eq!(descriptor.uri, "thought://thought/7");
        assert_eq!(descriptor.name, "Seven");
        assert_eq!(descriptor.description.unwrap().chars().count(), 100);
        assert_eq!(descriptor.mime_type, "text/plain");
    }

    #[test]
    fn descriptor_without_notes_omits_description() {
        let descriptor = ResourceDescriptor::for_thought(&json!({"id": "1", "name": "One"}));
        let value = serde_json::to_value(descriptor).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(value["mimeType"], "text/plain");
    }

    #[test]
    fn markdown_full_document() {
        let doc = render_markdown(&json!({
            "name": "Rust",
            "notes": "Fast and safe",
            "links": [{"name": "Cargo", "type": "child"}],
            "created_at": "2024-01-01T00:00:00Z",
            "modified_at": "2024-02-01T00:00:00Z",
        }));

        assert_eq!(
            doc,
            "# Rust\n\n\
             ## Notes\n\nFast and safe\n\n\
             ## Links\n\n- Cargo (child)\n\n\
             **Created:** 2024-01-01T00:00:00Z\n\
             **Modified:** 2024-02-01T00:00:00Z\n"
        );
    }

    #[test]
    fn markdown_skips_empty_sections() {
        let doc = render_markdown(&json!({
            "name": "Bare",
            "notes": "",
            "links": [],
            "created_at": "",
        }));
        assert_eq!(doc, "# Bare\n\n");
    }
}
