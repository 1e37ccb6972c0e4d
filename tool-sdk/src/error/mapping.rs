//! Mapping of HTTP error responses to `ServiceError`
//!
//! The three upstream APIs report errors differently:
//! - Ollama: `{"error": "model 'x' not found"}`
//! - Open-Meteo: `{"error": true, "reason": "Latitude must be in range..."}`
//! - MediaWiki: HTTP 200 with `{"error": {"code": "...", "info": "..."}}`

use reqwest::StatusCode;
use serde_json::Value;

use super::ServiceError;

/// Pull a human-readable message out of a JSON error body.
pub fn extract_message(json: &Value) -> Option<String> {
    if let Some(reason) = json.get("reason").and_then(Value::as_str) {
        return Some(reason.to_string());
    }

    match json.get("error") {
        Some(Value::String(message)) => return Some(message.clone()),
        Some(Value::Object(error)) => {
            let info = error
                .get("info")
                .or_else(|| error.get("message"))
                .and_then(Value::as_str);
            if let Some(info) = info {
                return Some(info.to_string());
            }
        }
        _ => {}
    }

    json.get("message").and_then(Value::as_str).map(str::to_string)
}

/// Map a non-success HTTP response to a ServiceError
pub fn map_http_error(status: StatusCode, body: &str) -> ServiceError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| extract_message(&json))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else if body.len() > 100 {
                let cut = body
                    .char_indices()
                    .take_while(|(i, _)| *i < 100)
                    .last()
                    .map(|(i, c)| i + c.len_utf8())
                    .unwrap_or(0);
                format!("{}: {}...", status, &body[..cut])
            } else {
                format!("{}: {}", status, body)
            }
        });

    match classify_http_error(status) {
        "authentication" => ServiceError::authentication(message),
        "not_found" => ServiceError::not_found(message),
        "timeout" => ServiceError::timeout(message),
        "rate_limit" => ServiceError::rate_limit(message),
        "server" => ServiceError::server(status.as_u16(), message),
        _ => ServiceError::validation(message),
    }
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        401 | 403 => "authentication",
        404 => "not_found",
        408 => "timeout",
        429 => "rate_limit",
        400..=499 => "validation",
        500..=599 => "server",
        _ => "unknown",
    }
}

/// Determine if an HTTP status code indicates a retryable error
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 500 | 502 | 503 | 504)
}
