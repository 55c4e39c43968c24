//! Tool dispatcher: one call in, one envelope out.
//!
//! Pipeline per call: lookup, argument normalization, validation, credential,
//! endpoint, request build, gateway, normalizer. Every step before the gateway
//! can fail locally, in which case no network traffic happens.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::credentials::CredentialResolver;
use super::endpoints::EndpointRegistry;
use super::envelope::Envelope;
use super::error::ToolError;
use super::gateway::{HttpExecutor, HttpGateway};
use super::normalizer::normalize;
use super::registry::ToolRegistry;
use super::request::OutboundRequest;
use super::validator::{normalize_args, validate};
use crate::core::config::Config;

/// Routes tool calls through the request pipeline.
///
/// Holds only read-only state, so one instance is shared by every
/// concurrent call.
#[derive(Clone)]
pub struct ToolDispatcher {
    endpoints: EndpointRegistry,
    credentials: CredentialResolver,
    gateway: HttpGateway,
}

impl ToolDispatcher {
    /// Dispatcher backed by a real HTTP client.
    ///
    /// Fails if any tool's endpoint does not resolve to a valid URL. A missing
    /// API key is only a warning; calls fail individually with `ConfigError`.
    pub fn from_config(config: &Config) -> Result<Self, ToolError> {
        let gateway = HttpGateway::reqwest(&config.gateway)?;
        Self::with_gateway(config, gateway)
    }

    /// Dispatcher using a caller-supplied executor (tests, alternate clients).
    pub fn with_executor(
        config: &Config,
        executor: Arc<dyn HttpExecutor>,
    ) -> Result<Self, ToolError> {
        Self::with_gateway(config, HttpGateway::new(executor, &config.gateway))
    }

    fn with_gateway(config: &Config, gateway: HttpGateway) -> Result<Self, ToolError> {
        let endpoints = EndpointRegistry::new(&config.endpoints);
        endpoints.check_catalog(ToolRegistry::all())?;

        let credentials = CredentialResolver::new(&config.credentials);
        if !credentials.is_configured() {
            warn!("AMAP_API_KEY is not set; every tool call will fail with ConfigError");
        }

        Ok(Self {
            endpoints,
            credentials,
            gateway,
        })
    }

    /// Dispatch without external cancellation.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Envelope {
        self.dispatch_with_cancel(name, arguments, &CancellationToken::new())
            .await
    }

    /// Dispatch a call; cancelling `cancel` aborts any in-flight request.
    #[instrument(skip_all, fields(tool = %name))]
    pub async fn dispatch_with_cancel(
        &self,
        name: &str,
        arguments: Value,
        cancel: &CancellationToken,
    ) -> Envelope {
        let Some(spec) = ToolRegistry::get(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolError::unknown_tool(name).into();
        };

        let prepared = normalize_args(arguments)
            .and_then(|raw| validate(spec, &raw))
            .and_then(|args| {
                let key = self.credentials.resolve_key()?;
                let base_url = self.endpoints.resolve(spec.endpoint)?;
                let request = OutboundRequest::build(spec, base_url, &args, key);
                Ok((args, request))
            });

        let (args, request) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("{} rejected before network: {}", spec.name, e);
                return e.into();
            }
        };

        info!("Calling {:?} {}", request.method, request.display_url());

        let outcome = self
            .gateway
            .execute(&request, cancel)
            .await
            .map_err(ToolError::from);
        let envelope = normalize(spec, &args, outcome);

        if !envelope.is_success() {
            warn!(
                "{} failed: {} ({})",
                spec.name,
                envelope.error().unwrap_or_default(),
                envelope.info()
            );
        }
        envelope
    }
}
