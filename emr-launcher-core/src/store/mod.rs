//! Raw configuration document stores
//!
//! A store turns a [`DocumentLocation`] into the document's text. The
//! implementation is chosen once at process start from the configured
//! [`ConfigSource`]; each location kind is served by exactly one store.

mod error;
mod local;
mod object;

pub use error::{StoreError, StoreResult};
pub use local::LocalDocumentStore;
pub use object::ObjectDocumentStore;

use crate::config::{ConfigSource, LauncherSettings};
use crate::http::{HttpClient, HttpError};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a raw document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocation {
    /// A file on the local filesystem
    Path(PathBuf),
    /// An object in an object-store bucket
    Object { bucket: String, key: String },
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocation::Path(path) => write!(f, "{}", path.display()),
            DocumentLocation::Object { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
        }
    }
}

/// Byte-fetch collaborator for configuration fragments
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Fetch the document at `location` as text
    async fn fetch(&self, location: &DocumentLocation) -> StoreResult<String>;
}

/// Create the store serving the configured source
pub fn create_store(
    settings: &LauncherSettings,
    http: &HttpClient,
) -> StoreResult<Arc<dyn DocumentStore>> {
    match &settings.source {
        ConfigSource::Local { .. } => Ok(Arc::new(LocalDocumentStore::new())),
        ConfigSource::ObjectStore { .. } => {
            let endpoint = settings.s3_endpoint.as_deref().ok_or_else(|| {
                StoreError::Http(HttpError::InvalidUrl {
                    url: String::new(),
                    message: "no object-store endpoint configured".to_string(),
                })
            })?;
            Ok(Arc::new(ObjectDocumentStore::new(
                http.clone(),
                endpoint,
                settings.http_timeout,
            )?))
        }
    }
}
