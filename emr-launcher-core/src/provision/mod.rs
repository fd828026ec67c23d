//! Cluster provisioning collaborator
//!
//! Submits a finished [`ConfigDocument`] to the provisioning API, tags the
//! resulting cluster and copies security configurations.

mod client;
mod error;

pub use client::EmrClient;
pub use error::{ProvisionError, ProvisionResult};

use crate::document::ConfigDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response of a successful cluster submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchResponse {
    /// Identifier of the submitted job flow
    pub job_flow_id: String,

    /// ARN of the new cluster, when the API returns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_arn: Option<String>,
}

/// Request/response calls against the provisioning API
#[async_trait]
pub trait ClusterProvisioner: Send + Sync {
    /// Submit a cluster-launch request
    async fn run_job_flow(&self, document: &ConfigDocument) -> ProvisionResult<LaunchResponse>;

    /// Add tags to a launched cluster, one call per tag in key order
    async fn add_tags(
        &self,
        job_flow_id: &str,
        tags: &BTreeMap<String, String>,
    ) -> ProvisionResult<()>;

    /// Duplicate the security configuration `name`, returning the copy's name
    async fn copy_security_configuration(&self, name: &str) -> ProvisionResult<String>;
}
