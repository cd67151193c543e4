//! MCP client connection manager for the mcpexec runtime.
//!
//! This crate owns the runtime's core: an explicit connection state machine,
//! lazy per-server stdio sessions, a per-server tool catalog cache, call
//! dispatch by composite tool identifier, and defensive unwrapping of
//! heterogeneous tool-call response envelopes.
//!
//! The central type is [`McpClientManager`]. Callers construct one manager
//! per process, call [`McpClientManager::initialize`] once, invoke tools via
//! [`McpClientManager::invoke`], and release everything with
//! [`McpClientManager::cleanup`].

pub mod config;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod stdio;
pub mod transport;
pub mod unwrap;

pub use config::{ConfigError, McpConfig, ServerConfig};
pub use manager::{McpClientManager, ServerStatus};
pub use protocol::{ContentBlock, ResponseEnvelope};
pub use state::ConnectionState;
pub use stdio::StdioTransport;
pub use transport::{ToolSession, Transport};
pub use unwrap::unwrap_response;
