//! HTTP plumbing shared by the remote collaborators
//!
//! This module implements the HTTP layer used by the object store, the
//! secrets extension client and the provisioning client, handling:
//! - Connection pooling and client management
//! - Request ID generation for correlation
//! - Error mapping for transport failures and error statuses

pub mod client;
pub mod error;

pub use client::{HttpClient, HttpResponse};
pub use error::{HttpError, HttpResult};

use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Options for an HTTP request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Request timeout
    pub timeout: Duration,

    /// Extra headers sent with the request
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: Duration::from_secs(30),
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    /// Create new request options with a generated request ID
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Add a header to this request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Parse an endpoint base URL
pub fn parse_endpoint(endpoint: &str) -> HttpResult<Url> {
    let url = Url::parse(endpoint).map_err(|e| HttpError::InvalidUrl {
        url: endpoint.to_string(),
        message: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(HttpError::InvalidUrl {
            url: endpoint.to_string(),
            message: "endpoint cannot be used as a base URL".to_string(),
        });
    }

    Ok(url)
}
