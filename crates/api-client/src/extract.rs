//! User-facing message extraction from backend error bodies

use serde_json::Value;

/// Pick the most user-friendly message out of an error payload.
///
/// Shapes are tried in order: `{"detail": "..."}`, the first
/// `{"detail": [{"msg": "..."}]}` entry, `{"message": "..."}`. Anything else
/// yields `fallback`.
pub fn extract_api_error(payload: &Value, fallback: &str) -> String {
    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(msg) = detail
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("msg"))
            .and_then(Value::as_str)
        {
            return msg.to_string();
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| fallback.to_string(), str::to_string)
}
