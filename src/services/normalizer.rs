use crate::services::transport::{RawResponse, TransportFailure};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Uniform outcome of one backend round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl BackendResult {
    /// Returned rows: an array as-is, a lone object as one row, anything else
    /// (absent data, raw text) as none.
    pub fn rows(&self) -> Vec<Value> {
        match &self.data {
            Some(Value::Array(items)) => items.clone(),
            Some(obj @ Value::Object(_)) => vec![obj.clone()],
            _ => Vec::new(),
        }
    }

    /// True when the transport never produced a response.
    pub fn is_transport_failure(&self) -> bool {
        !self.success && self.status.is_none()
    }
}

fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

pub fn normalize_response(raw: &RawResponse, elapsed: Duration) -> BackendResult {
    let duration_ms = Some(elapsed.as_millis() as u64);
    let parsed = parse_body(&raw.body);

    if raw.is_success() {
        return BackendResult {
            success: true,
            data: parsed,
            error: None,
            duration_ms,
            status: Some(raw.status),
        };
    }

    let message = parsed
        .as_ref()
        .and_then(|body| body.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(|m| m.to_string())
        .or_else(|| raw.reason.clone().filter(|r| !r.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", raw.status));

    BackendResult {
        success: false,
        data: parsed.filter(|body| body.is_object()),
        error: Some(message),
        duration_ms,
        status: Some(raw.status),
    }
}

pub fn normalize_failure(failure: &TransportFailure) -> BackendResult {
    BackendResult {
        success: false,
        data: None,
        error: Some(failure.to_string()),
        duration_ms: None,
        status: None,
    }
}
