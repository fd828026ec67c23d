//! Provisioning error types

use crate::http::HttpError;
use thiserror::Error;

/// Errors raised by the provisioning API
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The API rejected the call
    #[error("Provisioning API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Provisioning request failed: {0}")]
    Http(HttpError),

    #[error("Invalid provisioning response: {message}")]
    InvalidResponse { message: String },
}

impl From<HttpError> for ProvisionError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status {
                code: Some(code),
                message,
                ..
            } => ProvisionError::Api { code, message },
            other => ProvisionError::Http(other),
        }
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(err: serde_json::Error) -> Self {
        ProvisionError::InvalidResponse {
            message: err.to_string(),
        }
    }
}

/// Result type for provisioning operations
pub type ProvisionResult<T> = Result<T, ProvisionError>;
