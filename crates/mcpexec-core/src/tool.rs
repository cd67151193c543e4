use serde::{Deserialize, Serialize};

/// Metadata for one invocable tool, as returned by a server's `tools/list`.
///
/// Immutable once cached by the client manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within its server.
    pub name: String,
    /// Human-readable description, if the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema describing the tool's parameters.
    #[serde(default = "default_input_schema", rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

fn default_input_schema() -> serde_json::Value {
    serde_json::json!({"type": "object", "properties": {}})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_descriptor_parse() {
        let json = r#"{"name":"git_status","description":"Show working tree status","inputSchema":{"type":"object","properties":{"repo_path":{"type":"string"}}}}"#;
        let tool: ToolDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name, "git_status");
        assert_eq!(tool.description.as_deref(), Some("Show working tree status"));
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_tool_descriptor_defaults() {
        let tool: ToolDescriptor = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert!(tool.description.is_none());
        assert_eq!(tool.input_schema["type"], "object");
    }
}
