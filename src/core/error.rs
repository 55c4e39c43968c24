//! Error types and handling for the MCP server.
//!
//! This module defines the process-level error type. Per-call failures never
//! reach it: the tool dispatcher folds them into an envelope. What remains
//! here are startup and plumbing errors.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// The tool pipeline could not be assembled (bad endpoint URL, HTTP client).
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// The transport failed to start or stopped with an error.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::ToolError;

    #[test]
    fn test_tool_error_converts() {
        let err: Error = ToolError::config("no endpoint configured for 'geo'").into();
        assert!(matches!(err, Error::Tool(_)));
        assert!(err.to_string().contains("geo"));
    }

    #[test]
    fn test_config_error_message() {
        assert_eq!(
            Error::config("bad value").to_string(),
            "Configuration error: bad value"
        );
    }
}
