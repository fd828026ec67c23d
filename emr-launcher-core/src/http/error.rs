//! HTTP error mapping utilities

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the shared HTTP client
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Failed to create HTTP client: {message}")]
    Client { message: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Network error: {message} [request_id: {request_id}]")]
    Network { message: String, request_id: Uuid },

    #[error("Request timed out [request_id: {request_id}]")]
    Timeout { request_id: Uuid },

    #[error("HTTP error {status}: {message} [request_id: {request_id}]")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
        request_id: Uuid,
    },

    #[error("Response size {size} exceeds maximum {max} [request_id: {request_id}]")]
    ResponseTooLarge {
        size: usize,
        max: usize,
        request_id: Uuid,
    },
}

impl HttpError {
    /// Map a reqwest failure for the request `request_id`
    pub(crate) fn from_reqwest(err: reqwest::Error, request_id: Uuid) -> Self {
        if err.is_timeout() {
            HttpError::Timeout { request_id }
        } else if err.is_connect() {
            HttpError::Network {
                message: format!("Connection failed: {}", err),
                request_id,
            }
        } else {
            HttpError::Network {
                message: err.to_string(),
                request_id,
            }
        }
    }
}

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Map an error status and its body to an `HttpError::Status`
pub fn map_http_error(status: u16, body: &str, request_id: Uuid) -> HttpError {
    let details = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| extract_error_details(&v));

    let (code, message) = match details {
        Some(details) => (details.code, details.message),
        None if body.trim().is_empty() => (None, format!("HTTP error {}", status)),
        None => (None, body.trim().to_string()),
    };

    HttpError::Status {
        status,
        code,
        message,
        request_id,
    }
}

/// Error details extracted from response body
struct ErrorDetails {
    code: Option<String>,
    message: String,
}

/// Extract error details from a JSON error body
fn extract_error_details(json: &Value) -> Option<ErrorDetails> {
    // AWS JSON protocol: { "__type": "prefix#Code", "message": "..." }
    let code = json
        .get("__type")
        .and_then(|v| v.as_str())
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string());

    let message = json
        .get("message")
        .or_else(|| json.get("Message"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    match (code, message) {
        (code, Some(message)) => Some(ErrorDetails { code, message }),
        (Some(code), None) => Some(ErrorDetails {
            message: code.clone(),
            code: Some(code),
        }),
        (None, None) => json
            .get("error")
            .and_then(|v| v.as_str())
            .map(|error| ErrorDetails {
                code: None,
                message: error.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_aws_json_error() {
        let id = Uuid::new_v4();
        let err = map_http_error(
            400,
            r#"{"__type":"com.amazonaws.elasticmapreduce#InvalidRequestException","message":"bad subnet"}"#,
            id,
        );
        assert_eq!(
            err,
            HttpError::Status {
                status: 400,
                code: Some("InvalidRequestException".to_string()),
                message: "bad subnet".to_string(),
                request_id: id,
            }
        );
    }

    #[test]
    fn test_map_plain_body_error() {
        let id = Uuid::new_v4();
        let err = map_http_error(503, "", id);
        assert!(matches!(err, HttpError::Status { status: 503, code: None, .. }));
        assert!(err.to_string().contains("HTTP error 503"));

        let err = map_http_error(500, "<Error><Code>InternalError</Code></Error>", id);
        assert!(err.to_string().contains("InternalError"));
    }
}
