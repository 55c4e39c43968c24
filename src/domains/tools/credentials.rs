//! Credential resolver for the provider API key.

use super::error::ToolError;
use crate::core::config::CredentialsConfig;

/// Supplies the API key attached to every outbound request.
///
/// The key is captured once from configuration and only read afterwards.
#[derive(Clone)]
pub struct CredentialResolver {
    api_key: Option<String>,
}

impl CredentialResolver {
    pub fn new(config: &CredentialsConfig) -> Self {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        Self { api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn resolve_key(&self) -> Result<&str, ToolError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ToolError::config("missing credential: set AMAP_API_KEY"))
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Mask a key for logs: first 8 characters, then `...***`.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{prefix}...***")
}
