//! AMap MCP Server Library
//!
//! Exposes the AMap (Gaode) web-service APIs as Model Context Protocol tools.
//! Every tool call is validated locally, sent to the provider with a bounded
//! timeout and retry policy, and answered with a uniform envelope
//! `{status, data, error, info}`.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the MCP server handler and transports
//! - **domains::tools**: Tool catalog and the per-call request pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use amap_mcp_server::{core::Config, core::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     let envelope = server
//!         .call_tool("geocoding", serde_json::json!({"address": "北京市朝阳区阜通东大街6号"}))
//!         .await;
//!     println!("{}", envelope.to_value());
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::tools::{Envelope, ToolDispatcher};
