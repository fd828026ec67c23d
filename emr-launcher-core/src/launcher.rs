//! Launch orchestration
//!
//! One launch is: parse the payload, build the base document, apply the
//! payload, optionally copy the security configuration, submit, then tag.
//! Only the last three steps call the provisioning API.

use crate::config::{LauncherSettings, SafeLogging};
use crate::document::{ConfigDocument, DocumentError};
use crate::http::{HttpClient, HttpError};
use crate::loader::ConfigLoader;
use crate::provision::{ClusterProvisioner, EmrClient, LaunchResponse, ProvisionError};
use crate::request::{LaunchPayload, PayloadError, RequestBuilder};
use crate::resolver::{ExtensionSecretResolver, ResolveError};
use crate::store::{create_store, StoreError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Top-level key naming the cluster's security configuration
pub const SECURITY_CONFIGURATION_KEY: &str = "SecurityConfiguration";

/// Errors that abort a launch
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Cannot copy security configuration: document has no string '{}'", SECURITY_CONFIGURATION_KEY)]
    MissingSecurityConfiguration,
}

/// Errors raised while wiring the collaborators at startup
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolver(#[from] ResolveError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

/// Result type for launches
pub type LaunchResult<T> = Result<T, LaunchError>;

/// A document ready for submission, with the payload it was built from
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    pub document: ConfigDocument,
    pub payload: LaunchPayload,
}

/// Builds and submits cluster-launch requests
#[derive(Clone)]
pub struct Launcher {
    loader: ConfigLoader,
    provisioner: Arc<dyn ClusterProvisioner>,
}

impl Launcher {
    pub fn new(loader: ConfigLoader, provisioner: Arc<dyn ClusterProvisioner>) -> Self {
        Self {
            loader,
            provisioner,
        }
    }

    /// Wire the HTTP-backed collaborators described by `settings`
    pub fn from_settings(settings: &LauncherSettings) -> Result<Self, SetupError> {
        let http = HttpClient::with_config(Duration::from_secs(10), settings.http_timeout)?;

        let store = create_store(settings, &http)?;
        let resolver = ExtensionSecretResolver::new(
            http.clone(),
            &settings.secrets_endpoint,
            settings.secrets_token.clone(),
            settings.http_timeout,
        )?;
        let provisioner = EmrClient::new(http, &settings.emr_endpoint, settings.http_timeout)?;

        let loader = ConfigLoader::new(store, Arc::new(resolver), settings.source.clone());
        Ok(Self::new(loader, Arc::new(provisioner)))
    }

    /// Build the finished document for `event` without any provisioning call.
    ///
    /// A requested security-configuration copy is not made here; the document
    /// still names the original configuration.
    pub async fn prepare(&self, event: &Value) -> LaunchResult<PreparedLaunch> {
        let payload = LaunchPayload::from_event(event)?;

        let loader = match &payload.s3_overrides {
            Some(overrides) => self.loader.with_overrides(overrides),
            None => self.loader.clone(),
        };
        let document = loader.build_config().await?;
        let document = RequestBuilder::new(&payload).apply(document)?;

        debug!("Requested cluster parameters: {}", document.safe_for_logging());
        Ok(PreparedLaunch { document, payload })
    }

    /// Build, submit and tag one cluster
    pub async fn launch(&self, event: &Value) -> LaunchResult<LaunchResponse> {
        let PreparedLaunch {
            mut document,
            payload,
        } = self.prepare(event).await?;

        if payload.copy_secconfig {
            self.copy_security_configuration(&mut document).await?;
        }

        info!("Submitting cluster creation request");
        let response = self.provisioner.run_job_flow(&document).await?;
        debug!("Provisioning response: {:?}", response);

        let tags = payload.tags();
        if !tags.is_empty() {
            self.provisioner
                .add_tags(&response.job_flow_id, &tags)
                .await?;
        }

        Ok(response)
    }

    async fn copy_security_configuration(&self, document: &mut ConfigDocument) -> LaunchResult<()> {
        let name = match document.get(SECURITY_CONFIGURATION_KEY) {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(LaunchError::MissingSecurityConfiguration),
        };

        let copied = self.provisioner.copy_security_configuration(&name).await?;
        document.set(SECURITY_CONFIGURATION_KEY, Value::String(copied));
        Ok(())
    }
}
