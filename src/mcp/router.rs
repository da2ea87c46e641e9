//! Request routing for the MCP server.
//!
//! The router validates one message at a time, dispatches it through the
//! [`METHODS`] table (and, for `tools/call`, the tool table), and renders the
//! outcome as a single JSON-RPC response. It keeps no state between messages.
//!
//! Every failure is converted to an error envelope here and nowhere else:
//!
//! | error | code |
//! |---|---|
//! | protocol / tool-call validation | -32600 |
//! | unknown method | -32601 |
//! | unusable params | -32602 |
//! | TheBrain API status error | -32000, `data.status_code` |
//! | anything else | -32603, "Internal error" |

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::brain::{search_results, BrainClient, NewThought, Thought};
use crate::error::{Error, ProtocolError, Result};
use crate::mcp::protocol::{
    parse_message, ErrorCode, JsonRpcError, JsonRpcErrorData, JsonRpcRequest, JsonRpcResponse,
    RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::resources::{
    parse_thought_uri, render_markdown, ResourceContents, ResourceDescriptor, THOUGHT_MIME_TYPE,
};
use crate::mcp::tools::{
    parse_arguments, require, tool_definitions, CreateArgs, SearchArgs, ThoughtIdArgs, Tool,
    ToolCallParams, ToolCallResult, UpdateArgs, DEFAULT_SEARCH_LIMIT,
};

/// Number of thoughts fetched for `resources/list`.
const RESOURCE_LIST_LIMIT: u64 = 100;

/// Outcome of handling one message.
pub type Reply = std::result::Result<JsonRpcResponse, JsonRpcError>;

/// Methods the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Capability handshake.
    Initialize,
    /// Tool catalog.
    ToolsList,
    /// Tool invocation.
    ToolsCall,
    /// Thought resources.
    ResourcesList,
    /// Single thought as markdown.
    ResourcesRead,
}

/// Method name to method mapping.
pub const METHODS: [(&str, Method); 5] = [
    ("initialize", Method::Initialize),
    ("tools/list", Method::ToolsList),
    ("tools/call", Method::ToolsCall),
    ("resources/list", Method::ResourcesList),
    ("resources/read", Method::ResourcesRead),
];

impl Method {
    /// Looks up a method by its exact, case-sensitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        METHODS
            .iter()
            .find(|(method_name, _)| *method_name == name)
            .map(|(_, method)| *method)
    }
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ListCapabilities,
    /// Resource-related capabilities.
    pub resources: ListCapabilities,
}

/// Capabilities of a list-style feature.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapabilities {
    /// Whether the list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // skip_serializing_if takes fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Dispatches MCP messages to handlers backed by a [`BrainClient`].
pub struct Router {
    client: BrainClient,
}

impl Router {
    /// Creates a router over the given API client.
    #[must_use]
    pub const fn new(client: BrainClient) -> Self {
        Self { client }
    }

    /// The API client used by tool and resource handlers.
    #[must_use]
    pub const fn client(&self) -> &BrainClient {
        &self.client
    }

    /// Handles one input line.
    ///
    /// Returns `None` for a blank line; otherwise exactly one reply.
    pub async fn handle_line(&self, line: &str) -> Option<Reply> {
        if line.trim().is_empty() {
            return None;
        }

        let request = match parse_message(line) {
            Ok(request) => request,
            Err(err) => return Some(Err(error_reply(None, err.into()))),
        };

        tracing::debug!(method = %request.method, "Received message");

        let outcome = self.dispatch(&request).await;
        let reply = match outcome {
            Ok(result) => Ok(JsonRpcResponse::success(request.id, result)),
            Err(err) => Err(error_reply(request.id, err)),
        };
        Some(reply)
    }

    /// Runs the handler registered for the request's method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotFound`] for unknown methods, or whatever the
    /// handler failed with.
    pub async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value> {
        let Some(method) = Method::from_name(&request.method) else {
            return Err(Error::MethodNotFound(request.method.clone()));
        };

        match method {
            Method::Initialize => Ok(Self::initialize()),
            Method::ToolsList => Ok(json!({ "tools": tool_definitions() })),
            Method::ToolsCall => self.call_tool(request).await,
            Method::ResourcesList => self.list_resources().await,
            Method::ResourcesRead => self.read_resource(request).await,
        }
    }

    fn initialize() -> Value {
        tracing::info!("Handling initialize request");
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        })
    }

    async fn call_tool(&self, request: &JsonRpcRequest) -> Result<Value> {
        let params: ToolCallParams = match request.params.as_ref().filter(|p| !p.is_null()) {
            Some(params) => serde_json::from_value(params.clone())
                .map_err(|e| Error::InvalidParams(format!("Invalid tool call params: {e}")))?,
            None => ToolCallParams::default(),
        };

        tracing::info!(tool = %params.name, "Handling tool call");

        let tool = Tool::from_name(&params.name)
            .ok_or_else(|| ProtocolError::UnknownTool(params.name.clone()))?;
        let arguments = &params.arguments.unwrap_or_default();

        let result = match tool {
            Tool::SearchThoughts => self.search_thoughts(arguments).await?,
            Tool::GetThought => self.get_thought(arguments).await?,
            Tool::CreateThought => self.create_thought(arguments).await?,
            Tool::UpdateThought => self.update_thought(arguments).await?,
            Tool::DeleteThought => self.delete_thought(arguments).await?,
        };

        to_value(&result)
    }

    async fn search_thoughts(&self, arguments: &Map<String, Value>) -> Result<ToolCallResult> {
        let args: SearchArgs = parse_arguments(Tool::SearchThoughts, arguments)?;
        let query = require(args.query, "query")?;
        let limit = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

        let results = self.client.search(&query, limit).await?;
        let count = search_results(&results).len();

        Ok(ToolCallResult::summary_with_json(
            format!("Found {count} thoughts matching '{query}'"),
            &results,
        ))
    }

    async fn get_thought(&self, arguments: &Map<String, Value>) -> Result<ToolCallResult> {
        let args: ThoughtIdArgs = parse_arguments(Tool::GetThought, arguments)?;
        let thought_id = require(args.thought_id, "thought_id")?;

        let thought = self.client.get(&thought_id).await?;

        Ok(ToolCallResult::summary_with_json(
            format!("Retrieved thought: {}", Thought::new(&thought).name()),
            &thought,
        ))
    }

    async fn create_thought(&self, arguments: &Map<String, Value>) -> Result<ToolCallResult> {
        let args: CreateArgs = parse_arguments(Tool::CreateThought, arguments)?;
        let request = NewThought {
            name: require(args.name, "name")?,
            notes: args.notes,
            parent_id: args.parent_id,
            extra: Map::new(),
        };

        let created = self.client.create(&request).await?;
        let view = Thought::new(&created);

        Ok(ToolCallResult::summary_with_json(
            format!(
                "Created thought: {} (ID: {})",
                view.name(),
                view.id().unwrap_or_default()
            ),
            &created,
        ))
    }

    async fn update_thought(&self, arguments: &Map<String, Value>) -> Result<ToolCallResult> {
        let args: UpdateArgs = parse_arguments(Tool::UpdateThought, arguments)?;
        let thought_id = require(args.thought_id, "thought_id")?;
        let fields: Map<String, Value> = args
            .fields
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();

        let updated = self.client.update(&thought_id, &fields).await?;

        if updated.is_null() {
            return Ok(ToolCallResult::text(format!(
                "Updated thought: {thought_id}"
            )));
        }
        Ok(ToolCallResult::summary_with_json(
            format!("Updated thought: {}", Thought::new(&updated).name()),
            &updated,
        ))
    }

    async fn delete_thought(&self, arguments: &Map<String, Value>) -> Result<ToolCallResult> {
        let args: ThoughtIdArgs = parse_arguments(Tool::DeleteThought, arguments)?;
        let thought_id = require(args.thought_id, "thought_id")?;

        let text = if self.client.delete(&thought_id).await? {
            format!("Successfully deleted thought: {thought_id}")
        } else {
            format!("Failed to delete thought: {thought_id}")
        };

        Ok(ToolCallResult::text(text))
    }

    async fn list_resources(&self) -> Result<Value> {
        tracing::info!("Handling list resources request");

        let results = self.client.search("", RESOURCE_LIST_LIMIT).await?;
        let resources: Vec<ResourceDescriptor> = search_results(&results)
            .iter()
            .map(ResourceDescriptor::for_thought)
            .collect();

        Ok(json!({ "resources": resources }))
    }

    async fn read_resource(&self, request: &JsonRpcRequest) -> Result<Value> {
        let uri = request
            .param("uri")
            .and_then(Value::as_str)
            .unwrap_or_default();

        tracing::info!(uri, "Handling read resource");

        let thought_id = parse_thought_uri(uri)
            .ok_or_else(|| Error::InvalidParams(format!("Invalid resource URI: {uri}")))?;

        let thought = self.client.get(thought_id).await?;
        let contents = ResourceContents {
            uri: uri.to_string(),
            mime_type: THOUGHT_MIME_TYPE,
            text: render_markdown(&thought),
        };

        Ok(json!({ "contents": [contents] }))
    }
}

fn to_value<T: Serialize>(result: &T) -> Result<Value> {
    serde_json::to_value(result)
        .map_err(|e| Error::Internal(format!("failed to serialise result: {e}")))
}

/// Translates an error into its wire envelope.
///
/// Internal detail is logged and never echoed to the caller.
#[must_use]
pub fn error_reply(id: Option<RequestId>, err: Error) -> JsonRpcError {
    match err {
        Error::Protocol(err) => {
            tracing::warn!(error = %err, "Protocol error");
            JsonRpcError::new(
                id,
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, err.to_string()),
            )
        }
        Error::MethodNotFound(method) => JsonRpcError::method_not_found(id, &method),
        Error::InvalidParams(message) => JsonRpcError::new(
            id,
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, message),
        ),
        Error::Brain(err) if err.is_api_error() => {
            tracing::warn!(error = %err, status = ?err.status_code(), "TheBrain API error");
            JsonRpcError::new(
                id,
                JsonRpcErrorData::with_message(ErrorCode::UpstreamApi, err.to_string())
                    .with_data(json!({ "status_code": err.status_code() })),
            )
        }
        other => {
            tracing::error!(error = %other, "Unexpected error");
            tracing::debug!(error = ?other, "Unexpected error detail");
            JsonRpcError::internal_error(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::BrainError;
    use crate::config::ApiConfig;

    fn offline_router() -> Router {
        let config = ApiConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            api_key: Some("key".into()),
            brain_id: Some("brain".into()),
            retry_attempts: 0,
            ..ApiConfig::default()
        };
        Router::new(BrainClient::new(&config).unwrap())
    }

    fn reply_value(reply: Reply) -> Value {
        match reply {
            Ok(response) => serde_json::to_value(response).unwrap(),
            Err(error) => serde_json::to_value(error).unwrap(),
        }
    }

    #[test]
    fn method_table_is_exact() {
        for (name, method) in METHODS {
            assert_eq!(Method::from_name(name), Some(method));
        }
        assert_eq!(Method::from_name("Initialize"), None);
        assert_eq!(Method::from_name("ping"), None);
    }

    #[test]
    fn protocol_errors_map_to_invalid_request() {
        let reply = error_reply(
            Some(RequestId::Number(3)),
            ProtocolError::MissingArgument("name").into(),
        );
        assert_eq!(reply.error.code, -32600);
        assert_eq!(reply.error.message, "name is required");
        assert_eq!(reply.id, Some(RequestId::Number(3)));
    }

    #[test]
    fn api_errors_carry_status_code() {
        let reply = error_reply(None, BrainError::from_status(404, "{}".into()).into());
        assert_eq!(reply.error.code, -32000);
        assert_eq!(reply.error.message, "Thought not found");
        assert_eq!(reply.error.data, Some(json!({"status_code": 404})));
    }

    #[test]
    fn internal_errors_hide_detail() {
        let reply = error_reply(None, Error::Internal("secret detail".into()));
        assert_eq!(reply.error.code, -32603);
        assert_eq!(reply.error.message, "Internal error");
        assert!(reply.error.data.is_none());
    }

    #[tokio::test]
    async fn blank_lines_produce_no_reply() {
        let router = offline_router();
        assert!(router.handle_line("").await.is_none());
        assert!(router.handle_line("   \t").await.is_none());
    }

    #[tokio::test]
    async fn initialize_advertises_capabilities() {
        let router = offline_router();
        let reply = router
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let value = reply_value(reply);

        assert_eq!(value["id"], 1);
        assert_eq!(value["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(value["result"]["capabilities"]["tools"], json!({}));
        assert_eq!(value["result"]["capabilities"]["resources"], json!({}));
        assert_eq!(value["result"]["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn malformed_json_yields_null_id() {
        let router = offline_router();
        let value = reply_value(router.handle_line(r#"{"invalid": json}"#).await.unwrap());

        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32600);
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn unknown_tool_keeps_request_id() {
        let router = offline_router();
        let value = reply_value(
            router
                .handle_line(
                    r#"{"jsonrpc":"2.0","id":"x","method":"tools/call","params":{"name":"nope"}}"#,
                )
                .await
                .unwrap(),
        );

        assert_eq!(value["id"], "x");
        assert_eq!(value["error"]["code"], -32600);
        assert_eq!(value["error"]["message"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn null_arguments_are_treated_as_empty() {
        let router = offline_router();
        let value = reply_value(
            router
                .handle_line(
                    r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_thought","arguments":null}}"#,
                )
                .await
                .unwrap(),
        );

        assert_eq!(value["id"], 6);
        assert_eq!(value["error"]["code"], -32600);
        assert_eq!(value["error"]["message"], "thought_id is required");
    }

    #[tokio::test]
    async fn transport_failures_are_internal_errors() {
        let router = offline_router();
        let value = reply_value(
            router
                .handle_line(
                    r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_thought","arguments":{"thought_id":"1"}}}"#,
                )
                .await
                .unwrap(),
        );

        assert_eq!(value["error"]["code"], -32603);
        assert_eq!(value["error"]["message"], "Internal error");
    }
}
