//! Local filesystem store

use super::{DocumentLocation, DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use tracing::debug;

/// Reads documents from local files
#[derive(Debug, Clone, Default)]
pub struct LocalDocumentStore;

impl LocalDocumentStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, location: &DocumentLocation) -> StoreResult<String> {
        let DocumentLocation::Path(path) = location else {
            return Err(StoreError::UnsupportedLocation {
                store: self.name().to_string(),
                location: location.to_string(),
            });
        };

        debug!("Reading local config file {}", path.display());
        tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    location: location.to_string(),
                }
            } else {
                StoreError::Io {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })
    }
}
