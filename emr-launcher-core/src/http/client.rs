//! HTTP client implementation using reqwest

use crate::http::error::{map_http_error, HttpError};
use crate::http::HttpResult;
use crate::http::{RequestOptions, REQUEST_ID_HEADER};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("emr-launcher/", env!("CARGO_PKG_VERSION"));

/// A response whose body has been read
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
    pub request_id: uuid::Uuid,
}

impl HttpResponse {
    /// Turn non-success statuses into `HttpError::Status`
    pub fn error_for_status(self) -> HttpResult<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(map_http_error(self.status.as_u16(), &self.body, self.request_id))
        }
    }
}

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> HttpResult<Self> {
        Self::with_config(Duration::from_secs(10), Duration::from_secs(30))
    }

    /// Create a new HTTP client with custom timeouts
    pub fn with_config(connect_timeout: Duration, request_timeout: Duration) -> HttpResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| HttpError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Send a GET request
    pub async fn get(&self, url: &Url, options: &RequestOptions) -> HttpResult<HttpResponse> {
        self.execute(self.client.get(url.clone()), "GET", url, options)
            .await
    }

    /// Send a POST request with a pre-serialized body
    pub async fn post(
        &self,
        url: &Url,
        body: Vec<u8>,
        options: &RequestOptions,
    ) -> HttpResult<HttpResponse> {
        self.execute(self.client.post(url.clone()).body(body), "POST", url, options)
            .await
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        method: &str,
        url: &Url,
        options: &RequestOptions,
    ) -> HttpResult<HttpResponse> {
        let request_id = options.request_id;
        debug!("{} {} [request_id: {}]", method, url, request_id);

        let mut req_builder = builder
            .timeout(options.timeout)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        for (name, value) in &options.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        let response = req_builder.send().await.map_err(|e| {
            warn!("Request error for {} [request_id: {}]: {}", url, request_id, e);
            HttpError::from_reqwest(e, request_id)
        })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(HttpError::ResponseTooLarge {
                    size: content_length as usize,
                    max: self.max_response_size,
                    request_id,
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| HttpError::from_reqwest(e, request_id))?;

        if body.len() > self.max_response_size {
            return Err(HttpError::ResponseTooLarge {
                size: body.len(),
                max: self.max_response_size,
                request_id,
            });
        }

        Ok(HttpResponse {
            status,
            body,
            request_id,
        })
    }
}
