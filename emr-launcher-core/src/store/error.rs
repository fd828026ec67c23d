//! Document store error types

use crate::http::HttpError;
use thiserror::Error;

/// Errors raised while fetching raw documents
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing exists at the location
    #[error("Document not found at '{location}'")]
    NotFound { location: String },

    #[error("IO error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store request failed: {0}")]
    Http(#[from] HttpError),

    /// The store cannot serve this kind of location
    #[error("Store '{store}' cannot read '{location}'")]
    UnsupportedLocation { store: String, location: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
