//! Transport boundary between the client manager and tool-provider servers.
//!
//! The manager treats a connected server as a black box: it can list tools,
//! call a tool, and shut the session down. The [`Transport`] seam exists so
//! tests can substitute an in-memory implementation for the stdio one.

use crate::config::ServerConfig;
use crate::protocol::ResponseEnvelope;
use async_trait::async_trait;
use mcpexec_core::{McpExecResult, ToolDescriptor};
use std::sync::Arc;

/// A live, initialized protocol session with one tool-provider server.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Retrieves the server's tool catalog.
    async fn list_tools(&self) -> McpExecResult<Vec<ToolDescriptor>>;

    /// Invokes a tool by name and returns the classified response envelope.
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpExecResult<ResponseEnvelope>;

    /// Releases the session and its underlying process, best-effort.
    async fn shutdown(&self) -> McpExecResult<()>;
}

/// Factory for [`ToolSession`]s: spawns/attaches the server process and
/// performs the protocol handshake.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establishes a session for the named server.
    ///
    /// Any spawn or handshake failure must surface as a
    /// [`mcpexec_core::McpExecError::ServerConnection`] error naming the
    /// server; no partial session may be handed out.
    async fn connect(
        &self,
        server_name: &str,
        config: &ServerConfig,
    ) -> McpExecResult<Arc<dyn ToolSession>>;
}
