//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults. Environment values always win over compiled-in defaults.

use super::transport::TransportConfig;
use crate::domains::tools::ENDPOINT_DEFAULTS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// AMap web service credentials.
    pub credentials: CredentialsConfig,

    /// Outbound HTTP behaviour (timeout and retry policy).
    pub gateway: GatewayConfig,

    /// Per-endpoint base URL overrides.
    pub endpoints: EndpointsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// AMap web service key.
    /// Apply for one at: https://lbs.amap.com/dev/
    pub api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Largest accepted `AMAP_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Timeout and retry settings for calls to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Wall-clock limit for a single attempt, in seconds.
    pub timeout_secs: u64,

    /// Additional attempts after the first for transient failures.
    pub max_retries: u32,

    /// Base delay before the first retry; doubles on each further retry.
    pub retry_backoff_ms: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Base URL overrides keyed by endpoint key (e.g. `geo`, `driving`).
///
/// Keys without an override fall back to the compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub overrides: BTreeMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 200,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "amap-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            credentials: CredentialsConfig::default(),
            gateway: GatewayConfig::default(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_TRANSPORT`, ...). Provider settings use the
    /// `AMAP_` prefix (`AMAP_API_KEY`, `AMAP_TIMEOUT_SECS`, `AMAP_GEO_URL`, ...).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(ts) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = !matches!(ts.to_lowercase().as_str(), "false" | "0");
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(key) = std::env::var("AMAP_API_KEY") {
            if !key.trim().is_empty() {
                config.credentials.api_key = Some(key.trim().to_string());
                info!("AMap API key loaded from environment");
            }
        }

        if let Some(secs) = parse_env("AMAP_TIMEOUT_SECS") {
            config.gateway.timeout_secs = secs;
        }
        if let Some(retries) = parse_env("AMAP_MAX_RETRIES") {
            config.gateway.max_retries = retries;
        }
        if let Some(backoff) = parse_env("AMAP_RETRY_BACKOFF_MS") {
            config.gateway.retry_backoff_ms = backoff;
        }

        for endpoint in ENDPOINT_DEFAULTS {
            if let Ok(url) = std::env::var(endpoint.env_var) {
                if !url.trim().is_empty() {
                    info!("Endpoint '{}' overridden by {}", endpoint.key, endpoint.env_var);
                    config
                        .endpoints
                        .overrides
                        .insert(endpoint.key.to_string(), url.trim().to_string());
                }
            }
        }

        config
    }
}

impl Config {
    /// Reject settings the gateway cannot work with.
    pub fn validate(&self) -> super::error::Result<()> {
        if self.gateway.timeout_secs == 0 {
            return Err(super::error::Error::config(
                "AMAP_TIMEOUT_SECS must be at least 1",
            ));
        }
        if self.gateway.max_retries > MAX_RETRIES_LIMIT {
            return Err(super::error::Error::config(format!(
                "AMAP_MAX_RETRIES must be at most {MAX_RETRIES_LIMIT}, got {}",
                self.gateway.max_retries
            )));
        }
        if self.server.name.trim().is_empty() {
            return Err(super::error::Error::config("MCP_SERVER_NAME must not be empty"));
        }
        Ok(())
    }
}

/// Read and parse a numeric environment variable, warning on garbage.
pub(crate) fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("AMAP_API_KEY", "test_key_12345");
        }
        let config = Config::from_env();
        assert_eq!(config.credentials.api_key.as_deref(), Some("test_key_12345"));
        unsafe {
            std::env::remove_var("AMAP_API_KEY");
        }
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("AMAP_API_KEY", "   ");
        }
        let config = Config::from_env();
        assert!(config.credentials.api_key.is_none());
        unsafe {
            std::env::remove_var("AMAP_API_KEY");
        }
    }

    #[test]
    fn test_endpoint_override_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("AMAP_WALKING_URL", "http://127.0.0.1:9000/walk");
        }
        let config = Config::from_env();
        assert_eq!(
            config.endpoints.overrides.get("walking").map(String::as_str),
            Some("http://127.0.0.1:9000/walk")
        );
        assert!(!config.endpoints.overrides.contains_key("driving"));
        unsafe {
            std::env::remove_var("AMAP_WALKING_URL");
        }
    }

    #[test]
    fn test_gateway_settings_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("AMAP_TIMEOUT_SECS", "3");
            std::env::set_var("AMAP_MAX_RETRIES", "not-a-number");
        }
        let config = Config::from_env();
        assert_eq!(config.gateway.timeout(), Duration::from_secs(3));
        assert_eq!(config.gateway.max_retries, 2);
        unsafe {
            std::env::remove_var("AMAP_TIMEOUT_SECS");
            std::env::remove_var("AMAP_MAX_RETRIES");
        }
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            api_key: Some("super_secret_key".to_string()),
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.gateway.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_max_retries() {
        let mut config = Config::default();
        config.gateway.max_retries = MAX_RETRIES_LIMIT;
        assert!(config.validate().is_ok());
        config.gateway.max_retries = 40;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("AMAP_MAX_RETRIES"));
    }

    #[test]
    fn test_config_default_has_no_credentials() {
        let config = Config::default();
        assert!(config.credentials.api_key.is_none());
        assert_eq!(config.gateway.timeout_secs, 10);
        assert_eq!(config.gateway.max_retries, 2);
    }
}
