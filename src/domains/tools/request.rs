//! Request builder: validated args + credential + fixed fields.

use super::credentials::mask_key;
use super::schema::{HttpMethod, ToolSpec};
use super::validator::ValidatedArgs;

/// Query parameter carrying the credential.
pub const KEY_PARAM: &str = "key";

/// A fully resolved outbound request. Lives for a single call.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl OutboundRequest {
    /// Assemble the request for `spec`.
    ///
    /// Order: caller fields, then the key, then the tool's fixed fields.
    /// Later entries replace earlier ones with the same name, so neither
    /// the key nor a fixed field can be shadowed by caller input.
    pub fn build(spec: &ToolSpec, base_url: &str, args: &ValidatedArgs, api_key: &str) -> Self {
        let mut query: Vec<(String, String)> = Vec::with_capacity(args.len() + spec.fixed.len() + 1);

        for (name, value) in args.iter() {
            query.push((name.to_string(), value.to_string()));
        }
        set(&mut query, KEY_PARAM, api_key);
        for (name, value) in spec.fixed {
            set(&mut query, name, value);
        }

        Self {
            method: spec.method,
            url: base_url.to_string(),
            query,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Query pairs with the credential masked, for logging.
    pub fn redacted_query(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(k, v)| {
                if k == KEY_PARAM {
                    (k.clone(), mask_key(v))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }

    /// The request rendered as a URL with the credential masked.
    pub fn display_url(&self) -> String {
        match serde_urlencoded::to_string(self.redacted_query()) {
            Ok(qs) if !qs.is_empty() => format!("{}?{}", self.url, qs),
            _ => self.url.clone(),
        }
    }
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.redacted_query())
            .finish()
    }
}

fn set(query: &mut Vec<(String, String)>, name: &str, value: &str) {
    query.retain(|(k, _)| k != name);
    query.push((name.to_string(), value.to_string()));
}
