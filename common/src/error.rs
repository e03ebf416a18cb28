//! Request failure taxonomy shared by the frontend's API layer.
//!
//! The upstream API answers failures with a JSON body such as
//! `{"error": "..."}` or `{"message": "..."}`; anything else collapses into
//! the caller's generic message. Nothing is retried automatically.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (offline, CORS, aborted).
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response; `message` is already extracted from the body.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds an `Http` error from a raw response body.
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        ApiError::Http {
            status,
            message: error_message(body, fallback),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extracts a human message from an error body, falling back to `fallback`
/// when the body is empty, not JSON, or carries no known message key.
pub fn error_message(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback.to_string();
    };
    ["error", "message", "details"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(o) => o
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_error_then_message() {
        assert_eq!(
            error_message(r#"{"error":"Template in use","message":"ignored"}"#, "Failed"),
            "Template in use"
        );
        assert_eq!(error_message(r#"{"message":"Not found"}"#, "Failed"), "Not found");
        assert_eq!(
            error_message(r#"{"error":{"message":"nested"}}"#, "Failed"),
            "nested"
        );
    }

    #[test]
    fn falls_back_on_unparsable_or_empty_bodies() {
        assert_eq!(error_message("<html>502</html>", "Failed to save"), "Failed to save");
        assert_eq!(error_message("", "Failed to save"), "Failed to save");
        assert_eq!(error_message(r#"{"error":"  "}"#, "Failed to save"), "Failed to save");
    }

    #[test]
    fn http_error_displays_extracted_message() {
        let err = ApiError::from_response(409, r#"{"error":"Version exists"}"#, "Failed");
        assert_eq!(err.to_string(), "Version exists");
        assert_eq!(err.status(), Some(409));
    }
}
