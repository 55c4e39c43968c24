//! Tools domain module.
//!
//! Every MCP tool here is a thin wrapper over one AMap web-service endpoint.
//! A tool is pure data (a [`ToolSpec`]); all behaviour lives in the shared
//! request pipeline.
//!
//! ## Architecture
//!
//! - `definitions/` - Tool specs and response shapers, grouped by service
//! - `registry.rs` - Static tool catalog and MCP metadata
//! - `dispatcher.rs` - Per-call pipeline producing an [`Envelope`]
//! - `validator.rs` / `request.rs` - Argument checking and request assembly
//! - `gateway.rs` - Outbound HTTP with timeout, retry and cancellation
//! - `normalizer.rs` - Provider response to envelope
//! - `router.rs` - rmcp ToolRouter for STDIO/TCP transport
//!
//! ## Adding a New Tool
//!
//! 1. Add a `const ToolSpec` (and a shaper) in `definitions/`
//! 2. If it talks to a new endpoint, add it to `ENDPOINT_DEFAULTS`
//! 3. List it in the registry catalog
//!
//! Router, HTTP transport and validation pick it up from there.

pub mod credentials;
pub mod definitions;
mod dispatcher;
pub mod endpoints;
mod envelope;
mod error;
pub mod gateway;
pub mod normalizer;
mod registry;
pub mod request;
pub mod router;
pub mod schema;
pub mod validator;

pub use dispatcher::ToolDispatcher;
pub use endpoints::{ENDPOINT_DEFAULTS, EndpointRegistry};
pub use envelope::Envelope;
pub use error::{ToolError, TransportError};
pub use gateway::{HttpExecutor, HttpGateway, RawResponse, ReqwestExecutor};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
pub use schema::{HttpMethod, ParamDescriptor, ParamKind, ToolSpec};
pub use validator::ValidatedArgs;
