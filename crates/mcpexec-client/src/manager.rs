//! Lazy-loading MCP client connection manager.
//!
//! The manager owns the connection state machine, the map of live sessions,
//! and the per-server tool cache. Configuration is loaded at
//! [`McpClientManager::initialize`]; servers are connected only when one of
//! their tools is first invoked. A per-server async lock guards the
//! check-then-connect sequence so concurrent invokes against the same server
//! connect exactly once.

use crate::config::{McpConfig, ServerConfig};
use crate::state::ConnectionState;
use crate::stdio::StdioTransport;
use crate::transport::{ToolSession, Transport};
use crate::unwrap::unwrap_response;
use chrono::{DateTime, Utc};
use mcpexec_core::{McpExecError, McpExecResult, ToolDescriptor, ToolIdentifier};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Point-in-time status of one connected server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    /// Server name from configuration.
    pub name: String,
    /// Number of cached tool descriptors (0 until the catalog is fetched).
    pub tool_count: usize,
    /// When the session was established.
    pub connected_at: DateTime<Utc>,
}

struct SessionEntry {
    session: Arc<dyn ToolSession>,
    connected_at: DateTime<Utc>,
}

/// Lazy-loading client manager for MCP tool-provider servers.
///
/// One instance is constructed at process start and handed to all call
/// sites; all interior state is behind async locks.
///
/// State transitions:
/// - `uninitialized -> initialized` via [`Self::initialize`]
/// - `initialized -> connected` on the first successful server connection
/// - any state `-> uninitialized` via [`Self::cleanup`]
pub struct McpClientManager {
    transport: Arc<dyn Transport>,
    state: RwLock<ConnectionState>,
    config: RwLock<Option<McpConfig>>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    tool_cache: RwLock<HashMap<String, Vec<ToolDescriptor>>>,
    connect_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl McpClientManager {
    /// Creates an uninitialized manager using the stdio transport.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(StdioTransport))
    }

    /// Creates an uninitialized manager with a custom transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: RwLock::new(ConnectionState::Uninitialized),
            config: RwLock::new(None),
            sessions: RwLock::new(HashMap::new()),
            tool_cache: RwLock::new(HashMap::new()),
            connect_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Number of live server sessions.
    pub async fn server_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Status of all connected servers.
    pub async fn status(&self) -> Vec<ServerStatus> {
        let cache = self.tool_cache.read().await;
        self.sessions
            .read()
            .await
            .iter()
            .map(|(name, entry)| ServerStatus {
                name: name.clone(),
                tool_count: cache.get(name).map_or(0, Vec::len),
                connected_at: entry.connected_at,
            })
            .collect()
    }

    /// Loads and validates configuration from a JSON file.
    ///
    /// Requires the manager to be exactly `uninitialized`. Establishes no
    /// server connections; those happen lazily on the first tool call.
    pub async fn initialize(&self, config_path: &Path) -> McpExecResult<()> {
        self.state
            .read()
            .await
            .require_exactly(ConnectionState::Uninitialized, "initialize")?;

        let config = McpConfig::load(config_path).await?;
        self.install_config(config).await;
        Ok(())
    }

    /// Initializes from an already-built configuration.
    ///
    /// Same state requirements and transition as [`Self::initialize`].
    pub async fn initialize_with(&self, mut config: McpConfig) -> McpExecResult<()> {
        self.state
            .read()
            .await
            .require_exactly(ConnectionState::Uninitialized, "initialize")?;

        config.validate()?;
        self.install_config(config).await;
        Ok(())
    }

    async fn install_config(&self, config: McpConfig) {
        let total = config.servers.len();
        let enabled = config.get_enabled_servers().count();
        info!(total, enabled, "Configuration loaded");

        *self.config.write().await = Some(config);
        *self.state.write().await = ConnectionState::Initialized;
        debug!(from = %ConnectionState::Uninitialized, to = %ConnectionState::Initialized, "State transition");
    }

    /// Invokes a tool by composite identifier (`serverName__toolName`).
    ///
    /// Connects to the server and fetches its catalog lazily, dispatches the
    /// call, and returns the unwrapped payload.
    pub async fn invoke(
        &self,
        tool_identifier: &str,
        params: serde_json::Value,
    ) -> McpExecResult<serde_json::Value> {
        self.state
            .read()
            .await
            .require_at_least(ConnectionState::Initialized, "call tool")?;

        let id = ToolIdentifier::parse(tool_identifier)?;

        let server_config = self.enabled_server_config(&id.server).await?;
        let session = self.session_for(&id.server, &server_config).await?;

        let tools = self.server_tools(&id.server, &session).await?;
        if !tools.iter().any(|t| t.name == id.tool) {
            let available: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
            return Err(McpExecError::ToolNotFound(format!(
                "Tool '{}' not found on server '{}'. Available tools: {available:?}",
                id.tool, id.server
            )));
        }

        info!(tool = %id, "Executing tool");
        debug!(params = %params, "Tool parameters");

        let envelope = session
            .call_tool(&id.tool, params)
            .await
            .map_err(|e| McpExecError::execution(tool_identifier, e.to_string()))?;

        let unwrapped = unwrap_response(envelope);
        debug!(result = %unwrapped, "Tool execution result");
        Ok(unwrapped)
    }

    /// Lists tools from all enabled servers, in configuration order.
    ///
    /// Best-effort aggregation: a server that fails to connect or list is
    /// logged and skipped, and the remaining servers are still visited.
    pub async fn list_all_tools(&self) -> McpExecResult<Vec<ToolDescriptor>> {
        self.state
            .read()
            .await
            .require_at_least(ConnectionState::Initialized, "list all tools")?;

        let enabled: Vec<(String, ServerConfig)> = {
            let guard = self.config.read().await;
            let config = guard
                .as_ref()
                .ok_or_else(|| McpExecError::Configuration("configuration not loaded".into()))?;
            config
                .get_enabled_servers()
                .map(|(name, server)| (name.clone(), server.clone()))
                .collect()
        };

        if enabled.is_empty() {
            warn!("No enabled servers configured");
            return Ok(Vec::new());
        }

        info!(servers = enabled.len(), "Listing tools from enabled servers");

        let mut all_tools = Vec::new();
        for (name, server_config) in enabled {
            let session = match self.session_for(&name, &server_config).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(server = %name, error = %e, "Skipping server: connection failed");
                    continue;
                }
            };
            match self.server_tools(&name, &session).await {
                Ok(tools) => {
                    debug!(server = %name, tools = tools.len(), "Server tools listed");
                    all_tools.extend(tools);
                }
                Err(e) => {
                    warn!(server = %name, error = %e, "Skipping server: tool listing failed");
                }
            }
        }

        info!(total = all_tools.len(), "Tool listing complete");
        Ok(all_tools)
    }

    /// Releases every session, clears all cached state, and resets to
    /// `uninitialized`. Idempotent and safe to call from any state;
    /// per-session release failures are logged, never raised.
    pub async fn cleanup(&self) {
        info!("Cleaning up MCP client manager");

        let sessions: Vec<(String, SessionEntry)> =
            self.sessions.write().await.drain().collect();
        for (name, entry) in sessions {
            debug!(server = %name, "Closing connection");
            if let Err(e) = entry.session.shutdown().await {
                error!(server = %name, error = %e, "Error closing connection");
            }
        }

        self.tool_cache.write().await.clear();
        self.connect_locks.lock().await.clear();
        *self.config.write().await = None;
        *self.state.write().await = ConnectionState::Uninitialized;
        debug!(to = %ConnectionState::Uninitialized, "State transition");

        info!("Cleanup complete");
    }

    /// Looks up the named server in configuration, rejecting unknown and
    /// disabled servers with `ToolNotFound`.
    async fn enabled_server_config(&self, server: &str) -> McpExecResult<ServerConfig> {
        let guard = self.config.read().await;
        let config = guard
            .as_ref()
            .ok_or_else(|| McpExecError::Configuration("configuration not loaded".into()))?;

        let server_config = config.get_server(server).ok_or_else(|| {
            McpExecError::ToolNotFound(format!(
                "Server '{server}' not found in configuration. Available servers: {:?}",
                config.server_names()
            ))
        })?;

        if server_config.disabled {
            return Err(McpExecError::ToolNotFound(format!(
                "Server '{server}' is disabled in configuration"
            )));
        }

        Ok(server_config.clone())
    }

    /// Returns the live session for a server, connecting lazily.
    ///
    /// The check-then-connect sequence is guarded by a per-server lock so
    /// two concurrent calls for the same server connect exactly once.
    async fn session_for(
        &self,
        server: &str,
        config: &ServerConfig,
    ) -> McpExecResult<Arc<dyn ToolSession>> {
        if let Some(entry) = self.sessions.read().await.get(server) {
            return Ok(entry.session.clone());
        }

        let connect_lock = {
            let mut locks = self.connect_locks.lock().await;
            locks
                .entry(server.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = connect_lock.lock().await;

        // Another call may have connected while we waited for the lock.
        if let Some(entry) = self.sessions.read().await.get(server) {
            debug!(server = %server, "Server already connected");
            return Ok(entry.session.clone());
        }

        info!(server = %server, "Connecting to MCP server");
        let session = match self.transport.connect(server, config).await {
            Ok(session) => session,
            Err(e) => {
                error!(server = %server, error = %e, "Failed to connect to MCP server");
                return Err(e);
            }
        };

        self.sessions.write().await.insert(
            server.to_string(),
            SessionEntry {
                session: session.clone(),
                connected_at: Utc::now(),
            },
        );
        self.mark_connected().await;
        info!(server = %server, "Successfully connected to server");

        Ok(session)
    }

    async fn mark_connected(&self) {
        let mut state = self.state.write().await;
        if *state == ConnectionState::Initialized {
            *state = ConnectionState::Connected;
            debug!(from = %ConnectionState::Initialized, to = %ConnectionState::Connected, "State transition");
        }
    }

    /// Returns the server's tool catalog, fetching and caching it on first
    /// use. The cache lives until [`Self::cleanup`].
    async fn server_tools(
        &self,
        server: &str,
        session: &Arc<dyn ToolSession>,
    ) -> McpExecResult<Vec<ToolDescriptor>> {
        if let Some(tools) = self.tool_cache.read().await.get(server) {
            debug!(server = %server, "Using cached tools");
            return Ok(tools.clone());
        }

        match session.list_tools().await {
            Ok(tools) => {
                debug!(server = %server, tools = tools.len(), "Cached tools for server");
                self.tool_cache
                    .write()
                    .await
                    .insert(server.to_string(), tools.clone());
                Ok(tools)
            }
            Err(e) => {
                error!(server = %server, error = %e, "Failed to list tools from server");
                Err(McpExecError::connection(
                    server,
                    format!("could not list tools: {e}"),
                ))
            }
        }
    }
}

impl Default for McpClientManager {
    fn default() -> Self {
        Self::new()
    }
}
