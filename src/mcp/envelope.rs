use crate::errors::ToolError;
use crate::utils::redact::redact_value;
use serde_json::Value;

const PAYLOAD_MAX_BYTES: usize = 64 * 1024;

/// Uniform outcome of one tool invocation: a summary for the model plus the
/// affected record(s) or the failure detail.
#[derive(Debug, Clone)]
pub struct ToolResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
    pub error: Option<ToolError>,
}

impl ToolResponse {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: ToolError) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error),
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.code.as_str())
    }

    fn payload(&self) -> Option<Value> {
        if self.success {
            return self.data.clone();
        }
        let err = self.error.as_ref()?;
        let mut out = serde_json::json!({
            "error": {
                "kind": err.kind,
                "code": err.code,
                "message": err.message,
                "retryable": err.retryable,
            }
        });
        if let Some(hint) = &err.hint {
            out["error"]["hint"] = Value::String(hint.clone());
        }
        if let Some(details) = &err.details {
            out["details"] = details.clone();
        }
        Some(out)
    }

    /// MCP `tools/call` result. The second text block repeats the payload as
    /// JSON for clients that ignore `structuredContent`.
    pub fn to_call_result(&self) -> Value {
        let mut content = vec![serde_json::json!({"type": "text", "text": self.message})];
        let payload = self
            .payload()
            .map(|p| redact_value(&p, PAYLOAD_MAX_BYTES));
        if let Some(payload) = &payload {
            content.push(serde_json::json!({
                "type": "text",
                "text": serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()),
            }));
        }
        let mut result = serde_json::json!({
            "content": content,
            "isError": !self.success,
        });
        if let Some(payload) = payload {
            let structured = if payload.is_object() {
                payload
            } else {
                serde_json::json!({ "data": payload })
            };
            result["structuredContent"] = structured;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_result_carries_record_twice() {
        let record = serde_json::json!({"name": "Ada Lovelace", "mobile": "+1234567890"});
        let result = ToolResponse::success("Created reservation for Ada Lovelace", record.clone())
            .to_call_result();
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["text"], "Created reservation for Ada Lovelace");
        let echoed: Value =
            serde_json::from_str(result["content"][1]["text"].as_str().unwrap()).unwrap();
        assert_eq!(echoed, record);
        assert_eq!(result["structuredContent"], record);
    }

    #[test]
    fn list_payloads_are_wrapped_for_structured_content() {
        let rows = serde_json::json!([{"id": 1}, {"id": 2}]);
        let result = ToolResponse::success("Found 2 reservations", rows.clone()).to_call_result();
        assert_eq!(result["structuredContent"]["data"], rows);
    }

    #[test]
    fn failure_result_exposes_code_and_details() {
        let err = ToolError::backend_rejected("duplicate key value")
            .with_details(serde_json::json!({"status": 409}));
        let result = ToolResponse::failure("Failed to update the reservation", err).to_call_result();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["code"], "BACKEND_REJECTION");
        assert_eq!(result["structuredContent"]["details"]["status"], 409);
    }
}
