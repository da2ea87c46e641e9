//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! This module defines the core message types used in the Model Context Protocol.
//! All messages follow the JSON-RPC 2.0 specification with MCP-specific extensions.
//!
//! # Message Types
//!
//! - **Request**: an incoming message naming a method (the `id` may be absent)
//! - **Response**: a reply carrying either `result` or `error`, never both
//!
//! Responses always carry an `id` member: the request id when the request was
//! parsed, `null` otherwise.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "thebrain-mcp";

/// The only accepted `jsonrpc` tag.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request ID.
///
/// Treated as an opaque correlation token and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Integer request ID.
    Number(i64),
    /// String request ID.
    String(String),
    /// Any other JSON value a client chose to send.
    Other(Value),
}

impl RequestId {
    /// Converts a raw `id` member; `null` means no id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::Other(value.clone()), Self::Number),
            ),
            other => Some(Self::Other(other.clone())),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// A validated JSON-RPC 2.0 request message.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    /// Request identifier, if the client sent one.
    pub id: Option<RequestId>,

    /// The method to invoke.
    pub method: String,

    /// Optional parameters for the method.
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns `params.<key>`, if present.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|params| params.get(key))
    }
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: Option<RequestId>,

    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// JSON-RPC 2.0 error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The JSON sent is not a valid Request object, or a tool call is malformed.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
    /// The TheBrain API answered with an error status.
    UpstreamApi,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::UpstreamApi => -32000,
        }
    }

    /// Returns the default message for this error code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::UpstreamApi => "Server error",
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,

    /// Additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Creates a new error from an error code.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.default_message().to_string(),
            data: None,
        }
    }

    /// Creates a new error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Adds additional data to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this error corresponds to; `null` when unknown.
    pub id: Option<RequestId>,

    /// The error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: Option<RequestId>, method: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// Creates an internal error response with the fixed public message.
    #[must_use]
    pub fn internal_error(id: Option<RequestId>) -> Self {
        Self::new(id, JsonRpcErrorData::from_code(ErrorCode::InternalError))
    }
}

/// Parses one line of input into a validated request.
///
/// Checks, in order: the text is JSON, the value is an object, `jsonrpc` is
/// `"2.0"`, and `method` is a string. Nothing else is normalised.
///
/// # Errors
///
/// Returns the [`ProtocolError`] for the first check that fails.
pub fn parse_message(json: &str) -> Result<JsonRpcRequest, ProtocolError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let Value::Object(mut obj) = value else {
        return Err(ProtocolError::NotAMap);
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(ProtocolError::InvalidVersion);
    }

    let Some(Value::String(method)) = obj.remove("method") else {
        return Err(ProtocolError::MethodNotString);
    };

    Ok(JsonRpcRequest {
        id: obj.get("id").and_then(RequestId::from_value),
        method,
        params: obj.remove("params"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_request() {
        let json = r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#;
        let req = parse_message(json).unwrap();

        assert_eq!(req.id, Some(RequestId::Number(1)));
        assert_eq!(req.method, "initialize");
        assert_eq!(req.params, Some(json!({})));
    }

    #[test]
    fn parse_request_without_id() {
        let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;
        let req = parse_message(json).unwrap();

        assert!(req.id.is_none());
        assert!(req.params.is_none());
    }

    #[test]
    fn parse_string_id() {
        let json = r#"{"jsonrpc": "2.0", "id": "abc-123", "method": "test"}"#;
        let req = parse_message(json).unwrap();
        assert_eq!(req.id, Some(RequestId::String("abc-123".to_string())));
    }

    #[test]
    fn parse_opaque_id() {
        let json = r#"{"jsonrpc": "2.0", "id": 1.5, "method": "test"}"#;
        let req = parse_message(json).unwrap();
        assert_eq!(req.id, Some(RequestId::Other(json!(1.5))));
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_message("not valid json").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidJson(_)));
        assert!(err.to_string().starts_with("Invalid JSON"));
    }

    #[test]
    fn parse_non_object() {
        assert_eq!(parse_message("[1, 2]").unwrap_err(), ProtocolError::NotAMap);
        assert_eq!(parse_message("\"text\"").unwrap_err(), ProtocolError::NotAMap);
    }

    #[test]
    fn parse_missing_jsonrpc() {
        let json = r#"{"id": 1, "method": "test"}"#;
        assert_eq!(
            parse_message(json).unwrap_err(),
            ProtocolError::InvalidVersion
        );
    }

    #[test]
    fn parse_wrong_jsonrpc_version() {
        let json = r#"{"jsonrpc": "1.0", "id": 1, "method": "test"}"#;
        assert_eq!(
            parse_message(json).unwrap_err(),
            ProtocolError::InvalidVersion
        );
    }

    #[test]
    fn parse_missing_or_non_string_method() {
        let missing = r#"{"jsonrpc": "2.0", "id": 1}"#;
        assert_eq!(
            parse_message(missing).unwrap_err(),
            ProtocolError::MethodNotString
        );

        let numeric = r#"{"jsonrpc": "2.0", "id": 1, "method": 7}"#;
        assert_eq!(
            parse_message(numeric).unwrap_err(),
            ProtocolError::MethodNotString
        );
    }

    #[test]
    fn serialise_success_response() {
        let response = JsonRpcResponse::success(Some(RequestId::Number(1)), json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":1"#));
        assert!(json.contains(r#""result":{"ok":true}"#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn serialise_error_response() {
        let error = JsonRpcError::method_not_found(Some(RequestId::Number(1)), "unknown/method");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":1"#));
        assert!(json.contains(r#""code":-32601"#));
        assert!(json.contains("unknown/method"));
        assert!(!json.contains("result"));
        assert!(!json.contains("data"));
    }

    #[test]
    fn error_without_id_serialises_null_id() {
        let error = JsonRpcError::internal_error(None);
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32603);
        assert_eq!(value["error"]["message"], "Internal error");
    }

    #[test]
    fn error_data_is_attached() {
        let data = JsonRpcErrorData::with_message(ErrorCode::UpstreamApi, "Thought not found")
            .with_data(json!({"status_code": 404}));
        let value = serde_json::to_value(JsonRpcError::new(None, data)).unwrap();
        assert_eq!(value["error"]["code"], -32000);
        assert_eq!(value["error"]["data"]["status_code"], 404);
    }

    #[test]
    fn request_id_display() {
        assert_eq!(format!("{}", RequestId::Number(42)), "42");
        assert_eq!(format!("{}", RequestId::String("abc".to_string())), "abc");
    }
}
