use crate::error::{McpExecError, McpExecResult};

/// Separator between the server name and the tool name in a composite
/// tool identifier.
pub const TOOL_ID_SEPARATOR: &str = "__";

/// A parsed composite tool identifier of the form `serverName__toolName`.
///
/// The identifier is split on the *first* occurrence of the separator, so a
/// tool name may itself contain `__` but a server name may not. Both halves
/// must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolIdentifier {
    /// Name of the configured server the call is routed to.
    pub server: String,
    /// Name of the tool on that server.
    pub tool: String,
}

impl ToolIdentifier {
    /// Parses a raw identifier string.
    ///
    /// Returns a [`McpExecError::ToolNotFound`] error when the separator is
    /// missing or either half is empty.
    pub fn parse(raw: &str) -> McpExecResult<Self> {
        let (server, tool) = raw.split_once(TOOL_ID_SEPARATOR).ok_or_else(|| {
            McpExecError::ToolNotFound(format!(
                "Invalid tool identifier '{raw}'. Expected format: 'serverName__toolName'"
            ))
        })?;

        if server.is_empty() || tool.is_empty() {
            return Err(McpExecError::ToolNotFound(format!(
                "Invalid tool identifier '{raw}': server and tool names must be non-empty"
            )));
        }

        Ok(Self {
            server: server.to_string(),
            tool: tool.to_string(),
        })
    }
}

impl std::fmt::Display for ToolIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.server, TOOL_ID_SEPARATOR, self.tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = ToolIdentifier::parse("git__git_status").unwrap();
        assert_eq!(id.server, "git");
        assert_eq!(id.tool, "git_status");
    }

    #[test]
    fn test_parse_splits_on_first_separator() {
        // A tool name may itself contain the separator.
        let id = ToolIdentifier::parse("git__git__status").unwrap();
        assert_eq!(id.server, "git");
        assert_eq!(id.tool, "git__status");
    }

    #[test]
    fn test_parse_missing_separator() {
        let err = ToolIdentifier::parse("gitstatus").unwrap_err();
        assert!(matches!(err, McpExecError::ToolNotFound(_)));
        assert!(err.to_string().contains("serverName__toolName"));
    }

    #[test]
    fn test_parse_empty_halves() {
        assert!(ToolIdentifier::parse("__tool").is_err());
        assert!(ToolIdentifier::parse("server__").is_err());
        assert!(ToolIdentifier::parse("__").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let id = ToolIdentifier::parse("fetch__get_url").unwrap();
        assert_eq!(id.to_string(), "fetch__get_url");
    }
}
