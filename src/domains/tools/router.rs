//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every route delegates to the shared [`ToolDispatcher`]; the MCP request's
//! cancellation token is handed through so a client cancel aborts the
//! outbound HTTP call.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter};
use rmcp::model::CallToolResult;
use serde_json::Value;

use super::dispatcher::ToolDispatcher;
use super::registry::{ToolRegistry, to_tool};
use super::schema::ToolSpec;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(dispatcher: Arc<ToolDispatcher>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRegistry::all()
        .iter()
        .fold(ToolRouter::new(), |router, spec| {
            router.with_route(create_route(spec, dispatcher.clone()))
        })
}

fn create_route<S>(spec: &'static ToolSpec, dispatcher: Arc<ToolDispatcher>) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    ToolRoute::new_dyn(to_tool(spec), move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let cancel = ctx.request_context.ct.clone();
        let dispatcher = dispatcher.clone();
        async move {
            let envelope = dispatcher
                .dispatch_with_cancel(spec.name, Value::Object(args), &cancel)
                .await;
            Ok::<CallToolResult, McpError>(envelope.into_call_tool_result())
        }
        .boxed()
    })
}
