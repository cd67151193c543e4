//! Configuration for MCP servers.
//!
//! The config file is a JSON document with a required top-level `mcpServers`
//! mapping of server name to server definition. Server order is preserved so
//! aggregate operations visit servers in the order they were configured.

use indexmap::IndexMap;
use mcpexec_core::McpExecError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading or validating the configuration file.
///
/// Missing file, malformed JSON, and schema violations are distinct kinds;
/// all of them convert into [`McpExecError::Configuration`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist or could not be read.
    #[error("config file not found: {0}")]
    NotFound(String),

    /// The config file is not valid JSON.
    #[error("invalid JSON in config file: {0}")]
    Parse(String),

    /// The config parsed but violates the schema (empty server map, empty
    /// command, ...).
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for McpExecError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Configuration for a single MCP server process.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Command to execute (e.g. `npx`, `uvx`, `python`).
    pub command: String,
    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables for the server process.
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,
    /// When true, the server is skipped by all operations.
    #[serde(default)]
    pub disabled: bool,
}

/// Root configuration: mapping of server names to their definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct McpConfig {
    /// Configured servers, in file order.
    #[serde(rename = "mcpServers")]
    pub servers: IndexMap<String, ServerConfig>,
}

impl McpConfig {
    /// Loads and validates configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::NotFound(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Parses and validates configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the schema: at least one server, and every command
    /// non-empty once trimmed. Commands are normalized in place.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one MCP server must be configured".into(),
            ));
        }
        for (name, server) in &mut self.servers {
            let trimmed = server.command.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "server '{name}' has an empty command"
                )));
            }
            server.command = trimmed.to_string();
        }
        Ok(())
    }

    /// Looks up a server definition by name.
    pub fn get_server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// Returns the enabled servers in configuration order.
    pub fn get_enabled_servers(&self) -> impl Iterator<Item = (&String, &ServerConfig)> {
        self.servers.iter().filter(|(_, s)| !s.disabled)
    }

    /// Returns all configured server names, in configuration order.
    pub fn server_names(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }
}
