//! Provisioning API client (AWS JSON 1.1 protocol)
//!
//! Calls are `POST /` with an `X-Amz-Target: ElasticMapReduce.<Operation>`
//! header. Requests are not signed here; the endpoint is expected to handle
//! authentication (a signing proxy or a local emulator).

use super::{ClusterProvisioner, LaunchResponse, ProvisionError, ProvisionResult};
use crate::config::SafeLogging;
use crate::document::ConfigDocument;
use crate::http::{parse_endpoint, HttpClient, RequestOptions};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

const TARGET_HEADER: &str = "X-Amz-Target";
const TARGET_PREFIX: &str = "ElasticMapReduce";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSecurityConfigurationResponse {
    security_configuration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSecurityConfigurationResponse {
    #[serde(default)]
    name: Option<String>,
}

/// Client for the cluster provisioning API
#[derive(Clone)]
pub struct EmrClient {
    http: HttpClient,
    endpoint: Url,
    timeout: Duration,
}

impl EmrClient {
    pub fn new(http: HttpClient, endpoint: &str, timeout: Duration) -> ProvisionResult<Self> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint)?,
            timeout,
        })
    }

    /// Invoke one API operation and decode its response
    async fn call<T: DeserializeOwned>(&self, operation: &str, body: &Value) -> ProvisionResult<T> {
        let options = RequestOptions::new(self.timeout)
            .with_header(TARGET_HEADER, format!("{}.{}", TARGET_PREFIX, operation))
            .with_header("Content-Type", CONTENT_TYPE);
        debug!("Calling {} [request_id: {}]", operation, options.request_id);

        let response = self
            .http
            .post(&self.endpoint, serde_json::to_vec(body)?, &options)
            .await?
            .error_for_status()?;

        let text = if response.body.trim().is_empty() {
            "{}"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| ProvisionError::InvalidResponse {
            message: format!("{} response: {} [request_id: {}]", operation, e, response.request_id),
        })
    }
}

/// Name for a copy of the security configuration `name`
fn copied_name(name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", name, &suffix[..8])
}

#[async_trait]
impl ClusterProvisioner for EmrClient {
    async fn run_job_flow(&self, document: &ConfigDocument) -> ProvisionResult<LaunchResponse> {
        info!("Launching EMR cluster");
        debug!("EMR cluster config: {}", document.safe_for_logging());

        let body = Value::Object(document.as_map().clone());
        let response: LaunchResponse = self.call("RunJobFlow", &body).await?;

        info!("Cluster submission successful: {}", response.job_flow_id);
        Ok(response)
    }

    async fn add_tags(
        &self,
        job_flow_id: &str,
        tags: &BTreeMap<String, String>,
    ) -> ProvisionResult<()> {
        info!("Adding additional tags to cluster {}", job_flow_id);
        for (key, value) in tags {
            let body = json!({
                "ResourceId": job_flow_id,
                "Tags": [{"Key": key, "Value": value}],
            });
            let response: Value = self.call("AddTags", &body).await?;
            debug!("AddTags response for {}: {}", key, response);
        }
        info!("Successfully added additional tags");
        Ok(())
    }

    async fn copy_security_configuration(&self, name: &str) -> ProvisionResult<String> {
        let described: DescribeSecurityConfigurationResponse = self
            .call("DescribeSecurityConfiguration", &json!({ "Name": name }))
            .await?;

        let new_name = copied_name(name);
        let created: CreateSecurityConfigurationResponse = self
            .call(
                "CreateSecurityConfiguration",
                &json!({
                    "Name": new_name,
                    "SecurityConfiguration": described.security_configuration,
                }),
            )
            .await?;

        let created_name = created.name.unwrap_or(new_name);
        info!("Copied security configuration {} to {}", name, created_name);
        Ok(created_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copied_name_has_short_suffix() {
        let name = copied_name("emr-security");
        let (prefix, suffix) = name.rsplit_once('-').unwrap();
        assert_eq!(prefix, "emr-security");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(copied_name("emr-security"), name);
    }
}
