//! Response normalizer: provider response (or upstream error) -> envelope.

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::envelope::Envelope;
use super::error::{ToolError, TransportError};
use super::gateway::RawResponse;
use super::schema::ToolSpec;
use super::validator::ValidatedArgs;

/// Fields the provider uses for its own status reporting.
pub const BOOKKEEPING_FIELDS: &[&str] = &["status", "info", "infocode"];

const MALFORMED: &str = "malformed response";

/// Turn the outcome of the pipeline into an envelope.
pub fn normalize(
    spec: &ToolSpec,
    args: &ValidatedArgs,
    outcome: Result<RawResponse, ToolError>,
) -> Envelope {
    let result = outcome.and_then(|raw| interpret(spec, args, &raw));
    match result {
        Ok(data) => Envelope::success(data),
        Err(e) => Envelope::from(e),
    }
}

/// Parse a provider body and apply the tool's shaper on success.
///
/// The provider's own `status` wins over the HTTP status code whenever the
/// body is readable.
pub fn interpret(spec: &ToolSpec, args: &ValidatedArgs, raw: &RawResponse) -> Result<Value, ToolError> {
    let body: Map<String, Value> = match serde_json::from_slice::<Value>(&raw.body) {
        Ok(Value::Object(map)) => map,
        _ if !raw.is_success() => return Err(TransportError::Http(raw.status).into()),
        _ => {
            let preview: String = String::from_utf8_lossy(&raw.body).chars().take(100).collect();
            warn!("{}: JSON parse failed: {}...", spec.name, preview);
            return Err(ToolError::parse(MALFORMED));
        }
    };

    let provider_info = text_field(&body, "info");
    match provider_status(&body) {
        Some(true) => {
            info!("{} response: OK ({})", spec.name, provider_info.as_deref().unwrap_or(""));
            let payload = strip_bookkeeping(&Value::Object(body));
            Ok((spec.shaper)(&payload, args))
        }
        Some(false) => {
            let code = text_field(&body, "infocode");
            let info = provider_info.unwrap_or_else(|| "provider reported failure".to_string());
            let message = match &code {
                Some(code) => format!("{info} ({code})"),
                None => info,
            };
            warn!("{} response: failed ({})", spec.name, message);
            Err(ToolError::Provider { message, code })
        }
        None if !raw.is_success() => Err(TransportError::Http(raw.status).into()),
        None => Err(ToolError::Provider {
            message: "response carries no status indicator".to_string(),
            code: None,
        }),
    }
}

/// `Some(true)` for `"1"`/`1`, `Some(false)` for any other present value.
fn provider_status(body: &Map<String, Value>) -> Option<bool> {
    match body.get("status")? {
        Value::String(s) => Some(s == "1"),
        Value::Number(n) => Some(n.as_i64() == Some(1)),
        Value::Bool(b) => Some(*b),
        _ => Some(false),
    }
}

fn text_field(body: &Map<String, Value>, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Copy of `payload` without the provider's bookkeeping fields.
///
/// Shapers only ever see the stripped payload.
pub fn strip_bookkeeping(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !BOOKKEEPING_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::poi::SEARCH_POI_DETAIL;
    use serde_json::json;

    fn run(status: u16, body: &str) -> Envelope {
        normalize(
            &SEARCH_POI_DETAIL,
            &ValidatedArgs::default(),
            Ok(RawResponse::new(status, body)),
        )
    }

    #[test]
    fn test_upstream_error_passes_through() {
        let envelope = normalize(
            &SEARCH_POI_DETAIL,
            &ValidatedArgs::default(),
            Err(TransportError::Timeout.into()),
        );
        assert_eq!(envelope.status(), 0);
        assert_eq!(envelope.error(), Some("timeout"));
        assert_eq!(envelope.info(), "TransportError");
    }

    #[test]
    fn test_malformed_body() {
        let envelope = run(200, "<html>oops</html>");
        assert_eq!(envelope.error(), Some("malformed response"));
        assert_eq!(envelope.info(), "ParseError");
        assert!(envelope.data().is_none());
    }

    #[test]
    fn test_provider_success() {
        let envelope = run(
            200,
            r#"{"status":"1","info":"OK","infocode":"10000","pois":[{"id":"B0FFFZZZ5S","name":"望京SOHO"}]}"#,
        );
        assert_eq!(envelope.status(), 1);
        assert_eq!(envelope.info(), "OK");
        let data = envelope.data().unwrap();
        assert_eq!(data["poi"]["name"], "望京SOHO");
        assert!(data.get("status").is_none());
        assert!(data.get("infocode").is_none());
    }

    #[test]
    fn test_provider_failure_wins_over_http_200() {
        let envelope = run(200, r#"{"status":"0","info":"INVALID_USER_KEY","infocode":"10001"}"#);
        assert_eq!(envelope.status(), 0);
        assert_eq!(envelope.error(), Some("INVALID_USER_KEY (10001)"));
        assert_eq!(envelope.info(), "10001");
    }

    #[test]
    fn test_provider_success_wins_over_http_error() {
        let envelope = run(400, r#"{"status":"1","info":"OK","pois":[]}"#);
        assert_eq!(envelope.status(), 1);
    }

    #[test]
    fn test_unreadable_4xx_is_transport_error() {
        let envelope = run(404, "Not Found");
        assert_eq!(envelope.info(), "TransportError");
        assert_eq!(envelope.error(), Some("provider returned HTTP 404"));
    }

    #[test]
    fn test_numeric_status_accepted() {
        let envelope = run(200, r#"{"status":1,"pois":[]}"#);
        assert_eq!(envelope.status(), 1);
    }

    #[test]
    fn test_missing_status_is_provider_error() {
        let envelope = run(200, r#"{"pois":[]}"#);
        assert_eq!(envelope.status(), 0);
        assert_eq!(envelope.info(), "ProviderError");
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let envelope = run(200, "[1,2,3]");
        assert_eq!(envelope.info(), "ParseError");
    }

    #[test]
    fn test_strip_bookkeeping() {
        let stripped =
            strip_bookkeeping(&json!({"status": "1", "info": "OK", "infocode": "10000", "count": "2"}));
        assert_eq!(stripped, json!({"count": "2"}));
    }
}
