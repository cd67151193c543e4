//! Core types and error definitions for the mcpexec runtime.
//!
//! This crate provides the foundational types shared across all mcpexec
//! crates: the unified error enum, the tool descriptor retrieved from MCP
//! servers, and the composite tool identifier that routes a call to a
//! specific server and tool.
//!
//! # Main types
//!
//! - [`McpExecError`] — Unified error enum for the runtime.
//! - [`McpExecResult`] — Convenience alias for `Result<T, McpExecError>`.
//! - [`ToolDescriptor`] — Metadata for one invocable tool.
//! - [`ToolIdentifier`] — Parsed `serverName__toolName` routing pair.

mod error;
mod identifier;
mod tool;

pub use error::{McpExecError, McpExecResult};
pub use identifier::{ToolIdentifier, TOOL_ID_SEPARATOR};
pub use tool::ToolDescriptor;
