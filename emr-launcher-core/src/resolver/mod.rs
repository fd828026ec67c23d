//! Secret resolution
//!
//! Resolves an opaque secret identifier to its plaintext. Callers treat a
//! missing secret and a failed lookup the same way: the placeholder is left
//! as it was.

mod extension;

pub use extension::ExtensionSecretResolver;

use crate::config::SecretString;
use crate::http::HttpError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a secret lookup
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Secret lookup failed: {0}")]
    Http(#[from] HttpError),

    #[error("Secret '{secret_id}' has an unexpected format: {message}")]
    InvalidSecretFormat { secret_id: String, message: String },
}

/// Result type for secret lookups
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Name-to-value lookup against a secret store
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve `secret_id`, returning `None` when no such secret exists
    async fn resolve(&self, secret_id: &str) -> ResolveResult<Option<SecretString>>;
}
