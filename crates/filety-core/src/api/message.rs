//! Error message extraction from API responses
//!
//! Servers report failures in several shapes (`{"detail": "…"}`,
//! validation arrays `{"detail": [{"msg": "…"}]}`, `{"message": "…"}`,
//! `{"error": "…"}`, plain text). This module turns any of them into one
//! readable line.

use serde_json::Value;

/// Extract a human-readable message from an error response body
///
/// Order: `detail`, then `message`, then `error`, then the raw body.
/// An empty body yields `Request failed with status N`.
pub fn extract_error_message(status: u16, raw: &str) -> String {
    if raw.trim().is_empty() {
        return format!("Request failed with status {}", status);
    }

    let data: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return raw.to_string(),
    };

    if let Value::String(s) = &data {
        return s.clone();
    }

    if let Some(detail) = data.get("detail").and_then(detail_message) {
        return detail;
    }

    for key in ["message", "error"] {
        if let Some(Value::String(s)) = data.get(key) {
            return s.clone();
        }
    }

    raw.to_string()
}

/// Extract a structured error code (`code` at top level or inside `detail`)
pub fn extract_error_code(raw: &str) -> Option<String> {
    let data: Value = serde_json::from_str(raw).ok()?;

    let code = data
        .get("code")
        .or_else(|| data.get("detail").and_then(|d| d.get("code")))?;

    match code {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => match items.first()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            first => msg_field(first),
        },
        Value::Object(_) => msg_field(detail),
        _ => None,
    }
}

fn msg_field(value: &Value) -> Option<String> {
    match value.get("msg") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
