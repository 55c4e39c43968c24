//! The uniform result returned by every tool call.

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::error::ToolError;

/// Four-field result envelope.
///
/// Fields are private so that the only way to build one is through
/// [`Envelope::success`] or [`Envelope::failure`], which keep `status`,
/// `data` and `error` in lockstep: `status == 1` iff `data` is non-null iff
/// `error` is null.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Envelope {
    /// 1 = success, 0 = failure.
    status: u8,
    /// Shaped provider payload, present only on success.
    data: Option<Value>,
    /// Human-readable failure cause, present only on failure.
    error: Option<String>,
    /// Short status string: "OK" or a machine-distinguishable error code.
    info: String,
}

impl Envelope {
    pub const SUCCESS_INFO: &'static str = "OK";

    /// Successful envelope. A JSON `null` payload becomes an empty object.
    pub fn success(data: Value) -> Self {
        let data = if data.is_null() {
            Value::Object(Default::default())
        } else {
            data
        };
        Self {
            status: 1,
            data: Some(data),
            error: None,
            info: Self::SUCCESS_INFO.to_string(),
        }
    }

    /// Failed envelope with an explicit info code.
    pub fn failure(error: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            status: 0,
            data: None,
            error: Some(error.into()),
            info: info.into(),
        }
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == 1
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "status": 0,
                "data": null,
                "error": "failed to serialize envelope",
                "info": "Internal",
            })
        })
    }

    /// Convert into an MCP tool result.
    ///
    /// The envelope is carried as structured content and mirrored as a JSON
    /// text block for clients that ignore structured output.
    pub fn into_call_tool_result(self) -> CallToolResult {
        let value = self.to_value();
        let text = value.to_string();
        let mut result = CallToolResult::structured(value);
        result.content = vec![Content::text(text)];
        result.is_error = Some(!self.is_success());
        result
    }
}

impl From<ToolError> for Envelope {
    fn from(err: ToolError) -> Self {
        Self::failure(err.to_string(), err.info_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_lockstep(envelope: &Envelope) {
        let v = envelope.to_value();
        let ok = v["status"] == 1;
        assert_eq!(ok, !v["data"].is_null());
        assert_eq!(ok, v["error"].is_null());
    }

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success(json!({"location": "116.48,39.99"}));
        assert_eq!(
            envelope.to_value(),
            json!({
                "status": 1,
                "data": {"location": "116.48,39.99"},
                "error": null,
                "info": "OK"
            })
        );
        assert_lockstep(&envelope);
    }

    #[test]
    fn test_null_payload_stays_non_null() {
        let envelope = Envelope::success(Value::Null);
        assert_eq!(envelope.data(), Some(&json!({})));
        assert_lockstep(&envelope);
    }

    #[test]
    fn test_failure_from_error() {
        let envelope = Envelope::from(ToolError::missing_field("address"));
        assert_eq!(envelope.status(), 0);
        assert_eq!(envelope.error(), Some("missing field address"));
        assert_eq!(envelope.info(), "ValidationError");
        assert_lockstep(&envelope);
    }

    #[test]
    fn test_every_constructor_keeps_lockstep() {
        for envelope in [
            Envelope::success(Value::Null),
            Envelope::success(json!([])),
            Envelope::failure("", "ProviderError"),
            Envelope::from(ToolError::unknown_tool("teleport")),
        ] {
            assert_lockstep(&envelope);
        }
    }

    #[test]
    fn test_call_tool_result_flags_errors() {
        let ok = Envelope::success(json!({"a": 1})).into_call_tool_result();
        assert_eq!(ok.is_error, Some(false));
        assert_eq!(ok.structured_content.as_ref().unwrap()["status"], 1);

        let failed = Envelope::failure("timeout", "TransportError").into_call_tool_result();
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(failed.content.len(), 1);
    }
}
