//! Object-store backed document store

use super::{DocumentLocation, DocumentStore, StoreError, StoreResult};
use crate::http::{parse_endpoint, HttpClient, HttpError, RequestOptions};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Reads objects with path-style GET requests (`<endpoint>/<bucket>/<key>`)
#[derive(Clone)]
pub struct ObjectDocumentStore {
    http: HttpClient,
    endpoint: Url,
    timeout: Duration,
}

impl ObjectDocumentStore {
    pub fn new(http: HttpClient, endpoint: &str, timeout: Duration) -> StoreResult<Self> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint)?,
            timeout,
        })
    }

    /// Build the path-style URL of an object
    fn object_url(&self, bucket: &str, key: &str) -> StoreResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::Http(HttpError::InvalidUrl {
                    url: self.endpoint.to_string(),
                    message: "endpoint cannot be used as a base URL".to_string(),
                })
            })?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for ObjectDocumentStore {
    fn name(&self) -> &str {
        "object-store"
    }

    async fn fetch(&self, location: &DocumentLocation) -> StoreResult<String> {
        let DocumentLocation::Object { bucket, key } = location else {
            return Err(StoreError::UnsupportedLocation {
                store: self.name().to_string(),
                location: location.to_string(),
            });
        };

        let url = self.object_url(bucket, key)?;
        let options = RequestOptions::new(self.timeout);
        debug!(
            "Fetching object {} [request_id: {}]",
            location, options.request_id
        );

        let response = self.http.get(&url, &options).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                location: location.to_string(),
            });
        }

        Ok(response.error_for_status()?.body)
    }
}
