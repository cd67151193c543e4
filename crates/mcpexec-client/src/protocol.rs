//! MCP (Model Context Protocol) JSON-RPC 2.0 message types, plus the tagged
//! response envelope produced when parsing `tools/call` results.

use serde::Deserialize;
use serde::Serialize;

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// Protocol version marker, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request id, unique per session.
    pub id: u64,
    /// Method name (e.g. `tools/call`).
    pub method: String,
    /// Method parameters, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Creates a request with the protocol version preset.
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version marker.
    #[allow(dead_code)]
    pub jsonrpc: String,
    /// Id of the request this responds to; `None` for notifications.
    pub id: Option<u64>,
    /// Successful result payload.
    pub result: Option<serde_json::Value>,
    /// Error payload, mutually exclusive with `result`.
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured error data.
    pub data: Option<serde_json::Value>,
}

/// MCP server capabilities from the `initialize` response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Tool support, if advertised.
    #[serde(default)]
    pub tools: Option<serde_json::Value>,
    /// Resource support, if advertised.
    #[serde(default)]
    pub resources: Option<serde_json::Value>,
    /// Prompt support, if advertised.
    #[serde(default)]
    pub prompts: Option<serde_json::Value>,
}

/// MCP initialize response.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    /// Protocol version the server speaks.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Capabilities advertised by the server.
    #[serde(default)]
    pub capabilities: ServerCapabilities,
    /// Server identification, if provided.
    #[serde(default, rename = "serverInfo")]
    pub server_info: Option<ServerInfo>,
}

/// Server identification from the `initialize` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version string.
    #[serde(default)]
    pub version: String,
}

/// One block of a `content` array in a `tools/call` result.
///
/// Keeps the raw JSON alongside the extracted fields so an envelope can be
/// returned to the caller unmodified when no text unwrapping applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    /// Block type (`text`, `image`, ...). Empty when the block carries none.
    pub kind: String,
    /// Text payload, when the block has a string `text` attribute.
    pub text: Option<String>,
    /// The block exactly as received.
    pub raw: serde_json::Value,
}

impl ContentBlock {
    fn from_value(value: serde_json::Value) -> Self {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let text = value
            .get("text")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string);
        Self {
            kind,
            text,
            raw: value,
        }
    }
}

/// Tagged union over the known shapes of a `tools/call` result.
///
/// Built once at the transport-parsing layer so that the unwrapper can
/// pattern-match instead of probing attributes at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// The result carried an explicit `value` attribute (or a non-list
    /// `content` attribute); the payload has already been extracted.
    Value(serde_json::Value),
    /// The result carried a `content` list.
    Content(Vec<ContentBlock>),
    /// Any other shape, returned as-is.
    Opaque(serde_json::Value),
}

impl ResponseEnvelope {
    /// Classifies a raw `tools/call` result.
    ///
    /// Precedence matches the unwrapping rules: a `value` attribute wins
    /// over `content`, and everything else is opaque.
    pub fn from_result(result: serde_json::Value) -> Self {
        if !result.is_object() {
            return Self::Opaque(result);
        }

        if let Some(value) = result.get("value") {
            return Self::Value(value.clone());
        }

        match result.get("content").cloned() {
            Some(serde_json::Value::Array(items)) => {
                Self::Content(items.into_iter().map(ContentBlock::from_value).collect())
            }
            Some(other) => Self::Value(other),
            None => Self::Opaque(result),
        }
    }
}
