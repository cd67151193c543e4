//! Stdio transport — spawns an MCP server subprocess and exchanges
//! JSON-RPC 2.0 messages over its stdin/stdout pipes.

use crate::config::ServerConfig;
use crate::protocol::{InitializeResult, JsonRpcRequest, JsonRpcResponse, ResponseEnvelope};
use crate::transport::{ToolSession, Transport};
use async_trait::async_trait;
use mcpexec_core::{McpExecError, McpExecResult, ToolDescriptor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info};

/// Per-request timeout. The manager defines no cancellation of its own;
/// this bounds a single JSON-RPC round trip at the transport level.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Transport that runs one subprocess per server, speaking MCP over stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioTransport;

#[async_trait]
impl Transport for StdioTransport {
    async fn connect(
        &self,
        server_name: &str,
        config: &ServerConfig,
    ) -> McpExecResult<Arc<dyn ToolSession>> {
        let session = StdioSession::spawn(server_name, config).await?;
        Ok(Arc::new(session))
    }
}

/// A live stdio session with one MCP server subprocess.
pub struct StdioSession {
    stdin: Mutex<tokio::process::ChildStdin>,
    child: Mutex<Child>,
    pending: Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>,
    next_id: AtomicU64,
    server_name: String,
}

impl StdioSession {
    /// Spawns the server subprocess and performs the initialize handshake.
    pub async fn spawn(server_name: &str, config: &ServerConfig) -> McpExecResult<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);

        if let Some(env) = &config.env {
            for (key, val) in env {
                cmd.env(key, val);
            }
        }

        let mut child = cmd.spawn().map_err(|e| {
            McpExecError::connection(
                server_name,
                format!("failed to spawn '{}': {e}", config.command),
            )
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpExecError::connection(server_name, "server stdin not available"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpExecError::connection(server_name, "server stdout not available"))?;

        let pending: Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        // Reader task: routes each response line to its pending request.
        let pending_reader = pending.clone();
        let reader_server = server_name.to_string();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!(server = %reader_server, "MCP server stdout closed");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<JsonRpcResponse>(trimmed) {
                            Ok(resp) => {
                                if let Some(id) = resp.id {
                                    let mut map = pending_reader.lock().await;
                                    if let Some(tx) = map.remove(&id) {
                                        let _ = tx.send(resp);
                                    }
                                }
                                // Notifications (no id) are ignored.
                            }
                            Err(e) => {
                                debug!(
                                    server = %reader_server,
                                    line = %trimmed,
                                    error = %e,
                                    "Non-JSON-RPC line from MCP server"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        error!(server = %reader_server, error = %e, "Error reading MCP server stdout");
                        break;
                    }
                }
            }
        });

        let session = Self {
            stdin: Mutex::new(stdin),
            child: Mutex::new(child),
            pending,
            next_id: AtomicU64::new(1),
            server_name: server_name.to_string(),
        };

        let init_result = session.initialize().await?;
        info!(
            server = %session.server_name,
            version = %init_result.protocol_version,
            "MCP server initialized"
        );

        session.notify("notifications/initialized", None).await?;

        Ok(session)
    }

    /// Name of the server this session belongs to.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Sends a JSON-RPC request and waits for the matching response.
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> McpExecResult<JsonRpcResponse> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let req = JsonRpcRequest::new(id, method, params);

        let (tx, rx) = oneshot::channel();
        {
            let mut map = self.pending.lock().await;
            map.insert(id, tx);
        }

        let msg = serde_json::to_string(&req).map_err(|e| {
            McpExecError::connection(&self.server_name, format!("failed to serialize request: {e}"))
        })?;

        self.write_line(&msg).await?;

        let resp = tokio::time::timeout(REQUEST_TIMEOUT, rx)
            .await
            .map_err(|_| {
                McpExecError::connection(&self.server_name, format!("request '{method}' timed out"))
            })?
            .map_err(|_| {
                McpExecError::connection(&self.server_name, "response channel dropped")
            })?;

        if let Some(err) = &resp.error {
            return Err(McpExecError::connection(
                &self.server_name,
                format!("server error {}: {}", err.code, err.message),
            ));
        }

        Ok(resp)
    }

    /// Sends a JSON-RPC notification (no response expected).
    async fn notify(&self, method: &str, params: Option<serde_json::Value>) -> McpExecResult<()> {
        let msg = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params.unwrap_or(serde_json::json!({})),
        });

        let serialized = serde_json::to_string(&msg).map_err(|e| {
            McpExecError::connection(
                &self.server_name,
                format!("failed to serialize notification: {e}"),
            )
        })?;

        self.write_line(&serialized).await
    }

    async fn write_line(&self, msg: &str) -> McpExecResult<()> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(msg.as_bytes()).await.map_err(|e| {
            McpExecError::connection(&self.server_name, format!("failed to write to stdin: {e}"))
        })?;
        stdin.write_all(b"\n").await.map_err(|e| {
            McpExecError::connection(&self.server_name, format!("failed to write newline: {e}"))
        })?;
        stdin.flush().await.map_err(|e| {
            McpExecError::connection(&self.server_name, format!("failed to flush stdin: {e}"))
        })
    }

    /// Performs the MCP initialize handshake.
    async fn initialize(&self) -> McpExecResult<InitializeResult> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "mcpexec",
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let resp = self.request("initialize", Some(params)).await?;
        let result = resp.result.ok_or_else(|| {
            McpExecError::connection(&self.server_name, "empty initialize result")
        })?;

        serde_json::from_value(result).map_err(|e| {
            McpExecError::connection(
                &self.server_name,
                format!("failed to parse initialize result: {e}"),
            )
        })
    }
}

#[async_trait]
impl ToolSession for StdioSession {
    async fn list_tools(&self) -> McpExecResult<Vec<ToolDescriptor>> {
        let resp = self.request("tools/list", None).await?;
        let result = resp.result.ok_or_else(|| {
            McpExecError::connection(&self.server_name, "empty tools/list result")
        })?;

        serde_json::from_value(
            result
                .get("tools")
                .cloned()
                .unwrap_or(serde_json::json!([])),
        )
        .map_err(|e| {
            McpExecError::connection(&self.server_name, format!("failed to parse tools: {e}"))
        })
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpExecResult<ResponseEnvelope> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments,
        });

        let resp = self.request("tools/call", Some(params)).await?;
        let result = resp.result.ok_or_else(|| {
            McpExecError::connection(&self.server_name, "empty tools/call result")
        })?;

        Ok(ResponseEnvelope::from_result(result))
    }

    async fn shutdown(&self) -> McpExecResult<()> {
        let mut child = self.child.lock().await;
        if let Err(e) = child.start_kill() {
            debug!(server = %self.server_name, error = %e, "Server process already gone");
        }
        // Reap the process so it does not linger as a zombie.
        let _ = child.wait().await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config(command: &str) -> ServerConfig {
        ServerConfig {
            command: command.to_string(),
            args: vec![],
            env: None,
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_spawn_nonexistent_binary() {
        let err = StdioSession::spawn("ghost", &config("/nonexistent/mcp-server"))
            .await
            .err()
            .unwrap();
        match err {
            McpExecError::ServerConnection { server, reason } => {
                assert_eq!(server, "ghost");
                assert!(reason.contains("failed to spawn"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_connect_maps_spawn_failure() {
        let transport = StdioTransport;
        let err = transport
            .connect("ghost", &config("/nonexistent/mcp-server"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, McpExecError::ServerConnection { .. }));
    }
}
