//! MCP Server implementation and lifecycle management.
//!
//! The handler exposes tools only. Each tool call goes through the shared
//! [`ToolDispatcher`]; the ToolRouter is built from the tool registry in
//! `domains/tools/router.rs`, so adding a tool never touches this file.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as CoreResult;
use crate::domains::tools::{Envelope, ToolDispatcher, build_tool_router};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared per-call pipeline.
    dispatcher: Arc<ToolDispatcher>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Fails when the configuration is unusable, an endpoint URL is invalid
    /// or the HTTP client cannot be built. A missing API key does not fail startup.
    pub fn new(config: Config) -> CoreResult<Self> {
        config.validate()?;
        let dispatcher = Arc::new(ToolDispatcher::from_config(&config)?);
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    /// Create a server around an existing dispatcher.
    pub fn with_dispatcher(config: Config, dispatcher: Arc<ToolDispatcher>) -> Self {
        let tool_router = build_tool_router::<Self>(dispatcher.clone());
        info!("Registered {} tools", tool_router.list_all().len());
        Self {
            config: Arc::new(config),
            dispatcher,
            tool_router,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                    "outputSchema": t.output_schema,
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    ///
    /// Always yields an envelope; unknown tools produce a `DispatchError` one.
    pub async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Envelope {
        self.dispatcher.dispatch(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "AMap (Gaode) map tools: geocoding, reverse geocoding, route planning, POI \
                 search, administrative regions and IP positioning. Every tool returns an \
                 envelope {status, data, error, info}; status 1 means success. Coordinates \
                 are \"lng,lat\"."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::gateway::tests::StubExecutor;
    use serde_json::json;

    fn server() -> McpServer {
        let mut config = Config::default();
        config.credentials.api_key = Some("0123456789abcdef".into());
        let stub = StubExecutor::ok_json(r#"{"status": "1", "info": "OK", "province": "江苏省"}"#);
        let dispatcher = Arc::new(ToolDispatcher::with_executor(&config, stub).unwrap());
        McpServer::with_dispatcher(config, dispatcher)
    }

    #[test]
    fn test_list_tools() {
        let tools = server().list_tools();
        assert_eq!(tools.len(), 17);
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_call_tool_returns_envelope() {
        let envelope = server()
            .call_tool("ip_positioning", json!({"ip": "114.114.114.114"}))
            .await;
        assert_eq!(envelope.status(), 1);
        assert_eq!(envelope.data().unwrap()["location"]["province"], "江苏省");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.gateway.timeout_secs = 0;
        assert!(McpServer::new(config).is_err());
    }

    #[tokio::test]
    async fn test_new_builds_tool_router() {
        let server = McpServer::new(Config::default()).unwrap();
        assert_eq!(server.list_tools().len(), 17);
        assert_eq!(server.name(), Config::default().server.name);
    }

    #[test]
    fn test_get_info_enables_tools_only() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }
}
