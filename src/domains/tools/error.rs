//! Tool-specific error types.
//!
//! Every failure a tool call can hit is one of these variants. None of them
//! escape the dispatcher: each is folded into a `status: 0` envelope whose
//! `info` field is [`ToolError::info_code`].

use thiserror::Error;

/// Errors that can occur while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing credential or unresolvable endpoint.
    #[error("{0}")]
    Config(String),

    /// Malformed or missing caller input. No network call was made.
    #[error("{0}")]
    Validation(String),

    /// Network failure, timeout, cancellation or retry exhaustion.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider answered with something that is not JSON.
    #[error("{0}")]
    Parse(String),

    /// The provider explicitly signalled failure.
    #[error("{message}")]
    Provider {
        message: String,
        code: Option<String>,
    },

    /// No tool is registered under the requested name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a "missing field" validation error.
    pub fn missing_field(name: &str) -> Self {
        Self::Validation(format!("missing field {name}"))
    }

    /// Create an "invalid value" validation error with a reason.
    pub fn invalid_value(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Validation(format!("invalid value for {name}: {reason}"))
    }

    /// Create a new parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Short machine-readable code carried in the envelope's `info` field.
    pub fn info_code(&self) -> String {
        match self {
            Self::Config(_) => "ConfigError".to_string(),
            Self::Validation(_) => "ValidationError".to_string(),
            Self::Transport(_) => "TransportError".to_string(),
            Self::Parse(_) => "ParseError".to_string(),
            Self::Provider { code, .. } => code
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "ProviderError".to_string()),
            Self::UnknownTool(_) => "DispatchError".to_string(),
        }
    }
}

/// Failures of the outbound HTTP call itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// An attempt exceeded the configured wall-clock limit.
    #[error("timeout")]
    Timeout,

    /// The caller cancelled the call while it was in flight.
    #[error("cancelled")]
    Cancelled,

    /// Connection, DNS or body read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-2xx status and no usable body.
    #[error("provider returned HTTP {0}")]
    Http(u16),

    /// The provider kept answering with a 5xx status.
    #[error("provider returned HTTP {status} after {attempts} attempt(s)")]
    Server { status: u16, attempts: u32 },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    /// Whether the gateway may try again after this failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_) | Self::Server { .. })
    }
}
