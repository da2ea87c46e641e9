//! Tool catalog and typed tool arguments.
//!
//! The catalog is fixed for the lifetime of the process: five thought tools,
//! looked up by exact name through [`TOOLS`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, ProtocolError};

/// Default result limit for `search_thoughts`.
pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// The tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Free-text thought search.
    SearchThoughts,
    /// Fetch one thought by id.
    GetThought,
    /// Create a thought.
    CreateThought,
    /// Update fields of a thought.
    UpdateThought,
    /// Delete a thought.
    DeleteThought,
}

/// Tool name to tool mapping, in catalog order.
pub const TOOLS: [(&str, Tool); 5] = [
    ("search_thoughts", Tool::SearchThoughts),
    ("get_thought", Tool::GetThought),
    ("create_thought", Tool::CreateThought),
    ("update_thought", Tool::UpdateThought),
    ("delete_thought", Tool::DeleteThought),
];

impl Tool {
    /// Looks up a tool by its exact, case-sensitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        TOOLS
            .iter()
            .find(|(tool_name, _)| *tool_name == name)
            .map(|(_, tool)| *tool)
    }

    /// The tool's wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SearchThoughts => "search_thoughts",
            Self::GetThought => "get_thought",
            Self::CreateThought => "create_thought",
            Self::UpdateThought => "update_thought",
            Self::DeleteThought => "delete_thought",
        }
    }

    /// Catalog entry for `tools/list`.
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            Self::SearchThoughts => (
                "Search for thoughts in TheBrain",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of results",
                            "default": DEFAULT_SEARCH_LIMIT
                        }
                    },
                    "required": ["query"]
                }),
            ),
            Self::GetThought => (
                "Get a specific thought by ID",
                json!({
                    "type": "object",
                    "properties": {
                        "thought_id": {
                            "type": "string",
                            "description": "Unique identifier of the thought"
                        }
                    },
                    "required": ["thought_id"]
                }),
            ),
            Self::CreateThought => (
                "Create a new thought",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Name of the thought"
                        },
                        "notes": {
                            "type": "string",
                            "description": "Notes content for the thought"
                        },
                        "parent_id": {
                            "type": "string",
                            "description": "ID of the parent thought"
                        }
                    },
                    "required": ["name"]
                }),
            ),
            Self::UpdateThought => (
                "Update an existing thought",
                json!({
                    "type": "object",
                    "properties": {
                        "thought_id": {
                            "type": "string",
                            "description": "Unique identifier of the thought"
                        },
                        "name": {
                            "type": "string",
                            "description": "New name for the thought"
                        },
                        "notes": {
                            "type": "string",
                            "description": "New notes content"
                        }
                    },
                    "required": ["thought_id"]
                }),
            ),
            Self::DeleteThought => (
                "Delete a thought",
                json!({
                    "type": "object",
                    "properties": {
                        "thought_id": {
                            "type": "string",
                            "description": "Unique identifier of the thought to delete"
                        }
                    },
                    "required": ["thought_id"]
                }),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            input_schema,
        }
    }
}

/// Returns the full tool catalog in order.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    TOOLS.iter().map(|(_, tool)| tool.definition()).collect()
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    #[serde(default)]
    pub name: String,
    /// Arguments for the tool; absent and `null` both mean none.
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a result with a single text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }

    /// Creates a result with a summary line followed by a pretty-printed JSON dump.
    #[must_use]
    pub fn summary_with_json(summary: impl Into<String>, payload: &Value) -> Self {
        let mut result = Self::text(summary);
        result.content.push(ToolContent::Text {
            text: pretty_json(payload),
        });
        result
    }
}

fn pretty_json(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

/// Arguments of `search_thoughts`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchArgs {
    /// Search query; required and non-empty.
    #[serde(default)]
    pub query: Option<String>,
    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Arguments of tools that take only a thought id.
#[derive(Debug, Default, Deserialize)]
pub struct ThoughtIdArgs {
    /// Target thought; required and non-empty.
    #[serde(default)]
    pub thought_id: Option<String>,
}

/// Arguments of `create_thought`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateArgs {
    /// Thought name; required and non-empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Optional parent thought id.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Arguments of `update_thought`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArgs {
    /// Target thought; required and non-empty.
    #[serde(default)]
    pub thought_id: Option<String>,
    /// Every other supplied argument, forwarded as the update payload.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Decodes tool arguments into their typed form.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] when an argument has the wrong type.
pub fn parse_arguments<T: DeserializeOwned>(
    tool: Tool,
    arguments: &Map<String, Value>,
) -> Result<T, Error> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| {
        Error::InvalidParams(format!("Invalid arguments for {}: {e}", tool.name()))
    })
}

/// Unwraps a required string argument, rejecting absent and empty values.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingArgument`] naming the argument.
pub fn require(value: Option<String>, name: &'static str) -> Result<String, ProtocolError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ProtocolError::MissingArgument(name))
}
