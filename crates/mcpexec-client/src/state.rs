//! Explicit connection state machine for the client manager.

use mcpexec_core::{McpExecError, McpExecResult};

/// Lifecycle states of the client manager.
///
/// The derived ordering (`Uninitialized < Initialized < Connected`) backs
/// the minimum-state checks: operations that only need configuration accept
/// any state at or above [`ConnectionState::Initialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    /// Manager created but not initialized.
    Uninitialized,
    /// Configuration loaded, no server connections.
    Initialized,
    /// At least one server connection established.
    Connected,
}

impl ConnectionState {
    /// Requires the manager to be in precisely this state.
    pub fn require_exactly(self, required: Self, operation: &str) -> McpExecResult<()> {
        if self != required {
            return Err(McpExecError::Configuration(format!(
                "Cannot {operation}: manager is in state '{self}', but requires state '{required}'"
            )));
        }
        Ok(())
    }

    /// Requires the manager to be at or above the given minimum state.
    pub fn require_at_least(self, minimum: Self, operation: &str) -> McpExecResult<()> {
        if self < minimum {
            return Err(McpExecError::Configuration(format!(
                "Cannot {operation}: manager is in state '{self}', \
                 but requires at least state '{minimum}'"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}
