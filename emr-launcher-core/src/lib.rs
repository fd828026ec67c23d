//! EMR Launcher Core Library
//!
//! Assembles a cluster-launch request from layered configuration fragments,
//! resolves the secrets they reference, applies caller overrides and submits
//! the result to the provisioning API.
//!
//! The composition engine lives in [`document`], [`loader`] and [`request`];
//! the remote collaborators sit behind the [`store::DocumentStore`],
//! [`resolver::SecretResolver`] and [`provision::ClusterProvisioner`] traits.

pub mod config;
pub mod document;
pub mod http;
pub mod launcher;
pub mod loader;
pub mod provision;
pub mod request;
pub mod resolver;
pub mod store;

pub use config::{ConfigError, LauncherSettings};
pub use document::{ConfigDocument, DocumentError, DocumentResult};
pub use launcher::{LaunchError, LaunchResult, Launcher, PreparedLaunch, SetupError};
pub use loader::{ConfigLoader, Fragment};
pub use provision::LaunchResponse;
pub use request::{LaunchPayload, PayloadError, RequestBuilder};

/// Returns the version of the EMR Launcher Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
