use thiserror::Error;

/// Top-level error type for the mcpexec runtime.
///
/// Each variant corresponds to one failure kind in the runtime's taxonomy:
/// misuse of the manager or bad configuration, a failed spawn/handshake for
/// a named server, a call that could not be routed to any known tool, and a
/// remote execution that the transport accepted but the server failed.
#[derive(Debug, Error)]
pub enum McpExecError {
    /// Manager used in the wrong state, or configuration missing,
    /// malformed, or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Spawn or handshake failure for a named server, or a protocol
    /// operation attempted against a server with no live session.
    #[error("Server connection error for '{server}': {reason}")]
    ServerConnection {
        /// Name of the server that failed to connect.
        server: String,
        /// Underlying cause, preserved as text.
        reason: String,
    },

    /// Malformed tool identifier, unknown or disabled server, or tool name
    /// absent from the server's catalog.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The transport accepted the call but the remote execution failed.
    #[error("Tool execution failed for '{tool}': {reason}")]
    ToolExecution {
        /// Full identifier of the tool that failed.
        tool: String,
        /// Underlying cause, preserved as text.
        reason: String,
    },
}

/// A convenience `Result` alias using [`McpExecError`].
pub type McpExecResult<T> = Result<T, McpExecError>;

impl McpExecError {
    /// Shorthand for a [`McpExecError::ServerConnection`] error.
    pub fn connection(server: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ServerConnection {
            server: server.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`McpExecError::ToolExecution`] error.
    pub fn execution(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}
