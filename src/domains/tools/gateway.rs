//! HTTP gateway: executes an outbound request with a timeout and a bounded
//! retry policy.
//!
//! The single network attempt lives behind [`HttpExecutor`] so the retry
//! loop can be exercised without a network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::error::TransportError;
use super::request::OutboundRequest;
use super::schema::HttpMethod;
use crate::core::config::GatewayConfig;

/// Sent with every outbound request.
pub const USER_AGENT: &str = concat!("amap-mcp/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Status and body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Performs exactly one HTTP attempt.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// [`HttpExecutor`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        let response = builder
            .query(&request.query)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        debug!("Provider answered HTTP {} with {} bytes", status, body.len());
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Network(format!("connection failed: {e}"))
    } else {
        TransportError::Network(e.to_string())
    }
}

/// Timeout + retry wrapper around an [`HttpExecutor`].
#[derive(Clone)]
pub struct HttpGateway {
    executor: Arc<dyn HttpExecutor>,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl HttpGateway {
    pub fn new(executor: Arc<dyn HttpExecutor>, config: &GatewayConfig) -> Self {
        Self {
            executor,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }

    /// Gateway backed by a real HTTP client.
    pub fn reqwest(config: &GatewayConfig) -> Result<Self, TransportError> {
        let executor = ReqwestExecutor::new(config.timeout())?;
        Ok(Self::new(Arc::new(executor), config))
    }

    /// Delay before the `retry`-th retry (1-based): base, 2x base, 4x base, ...
    fn retry_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Execute `request`, retrying network errors, timeouts and 5xx.
    ///
    /// 2xx and 4xx responses are returned as-is on the first attempt that
    /// produces them. Cancellation is checked before each attempt, during
    /// each attempt and during backoff; it is never retried.
    pub async fn execute(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let attempts = self.max_retries.saturating_add(1);
        let mut last_error = TransportError::Network("no attempt made".to_string());

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.retry_delay(attempt - 1);
                debug!(
                    "Retrying (attempt {}/{}) after {}ms",
                    attempt,
                    attempts,
                    delay.as_millis()
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                result = tokio::time::timeout(self.timeout, self.executor.send(request)) => {
                    result.unwrap_or(Err(TransportError::Timeout))
                }
            };

            match outcome {
                Ok(response) if response.is_server_error() => {
                    warn!(
                        "Attempt {}/{} got HTTP {} from {}",
                        attempt, attempts, response.status, request.url
                    );
                    last_error = TransportError::Server {
                        status: response.status,
                        attempts: attempt,
                    };
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() => {
                    warn!("Attempt {}/{} to {} failed: {}", attempt, attempts, request.url, e);
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            "All {} attempt(s) to {} failed. Last error: {}",
            attempts, request.url, last_error
        );
        Err(last_error)
    }
}
