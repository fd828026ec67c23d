//! Shared fixtures and test doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use emr_launcher_core::config::{ConfigSource, SecretString};
use emr_launcher_core::loader::{ConfigLoader, Fragment};
use emr_launcher_core::provision::{ClusterProvisioner, LaunchResponse, ProvisionResult};
use emr_launcher_core::resolver::{ResolveError, ResolveResult, SecretResolver};
use emr_launcher_core::store::{
    DocumentLocation, DocumentStore, LocalDocumentStore, StoreError, StoreResult,
};
use emr_launcher_core::{ConfigDocument, Launcher};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const TEST_JOB_FLOW_ID: &str = "j-TESTCLUSTER";

/// Route library logs to the test harness; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("emr_launcher_core=debug")
        .with_test_writer()
        .try_init();
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn local_source() -> ConfigSource {
    ConfigSource::Local {
        dir: fixtures_dir(),
    }
}

/// Load one fixture fragment
pub fn fixture(fragment: Fragment) -> ConfigDocument {
    let path = fixtures_dir().join(fragment.file_name());
    let content = std::fs::read_to_string(&path).unwrap();
    ConfigDocument::from_yaml_str(&content, &path.display().to_string()).unwrap()
}

/// All fixture fragments folded together, secrets unresolved
pub fn default_config() -> ConfigDocument {
    let mut document = ConfigDocument::new();
    for fragment in Fragment::ALL {
        document.update(fixture(fragment));
    }
    document
}

pub fn test_secret(secret_id: &str) -> String {
    format!("TEST_SECRET_{}", secret_id)
}

/// `default_config()` with both metastore passwords resolved by `PrefixResolver`
pub fn resolved_default_config() -> ConfigDocument {
    let mut value = default_config().into_value();
    for item in value["Configurations"].as_array_mut().unwrap() {
        let properties = &mut item["Properties"];
        if let Some(Value::String(secret_id)) =
            properties.get("javax.jdo.option.ConnectionPassword").cloned()
        {
            properties["javax.jdo.option.ConnectionPassword"] = json!(test_secret(&secret_id));
        }
    }
    ConfigDocument::from_value(value).unwrap()
}

/// Resolves every secret to `TEST_SECRET_<id>`
pub struct PrefixResolver;

#[async_trait]
impl SecretResolver for PrefixResolver {
    async fn resolve(&self, secret_id: &str) -> ResolveResult<Option<SecretString>> {
        Ok(Some(SecretString::new(test_secret(secret_id))))
    }
}

/// Resolves from a fixed table, `None` for anything else
pub struct StaticResolver(pub HashMap<String, String>);

impl StaticResolver {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl SecretResolver for StaticResolver {
    async fn resolve(&self, secret_id: &str) -> ResolveResult<Option<SecretString>> {
        Ok(self.0.get(secret_id).map(|v| SecretString::new(v.as_str())))
    }
}

/// Fails every lookup
pub struct FailingResolver;

#[async_trait]
impl SecretResolver for FailingResolver {
    async fn resolve(&self, secret_id: &str) -> ResolveResult<Option<SecretString>> {
        Err(ResolveError::InvalidSecretFormat {
            secret_id: secret_id.to_string(),
            message: "lookup failed".to_string(),
        })
    }
}

/// In-memory store keyed by location, recording every fetch
#[derive(Default)]
pub struct MemoryStore {
    documents: Vec<(DocumentLocation, String)>,
    fetched: Mutex<Vec<DocumentLocation>>,
}

impl MemoryStore {
    pub fn with(mut self, location: DocumentLocation, content: &str) -> Self {
        self.documents.push((location, content.to_string()));
        self
    }

    pub fn fetched(&self) -> Vec<DocumentLocation> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, location: &DocumentLocation) -> StoreResult<String> {
        self.fetched.lock().unwrap().push(location.clone());
        self.documents
            .iter()
            .find(|(candidate, _)| candidate == location)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| StoreError::NotFound {
                location: location.to_string(),
            })
    }
}

/// Records provisioning calls instead of making them
#[derive(Default)]
pub struct RecordingProvisioner {
    pub submitted: Mutex<Vec<ConfigDocument>>,
    pub tagged: Mutex<Vec<(String, BTreeMap<String, String>)>>,
    pub copied: Mutex<Vec<String>>,
}

impl RecordingProvisioner {
    pub fn submitted(&self) -> Vec<ConfigDocument> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterProvisioner for RecordingProvisioner {
    async fn run_job_flow(&self, document: &ConfigDocument) -> ProvisionResult<LaunchResponse> {
        self.submitted.lock().unwrap().push(document.clone());
        Ok(LaunchResponse {
            job_flow_id: TEST_JOB_FLOW_ID.to_string(),
            cluster_arn: None,
        })
    }

    async fn add_tags(
        &self,
        job_flow_id: &str,
        tags: &BTreeMap<String, String>,
    ) -> ProvisionResult<()> {
        self.tagged
            .lock()
            .unwrap()
            .push((job_flow_id.to_string(), tags.clone()));
        Ok(())
    }

    async fn copy_security_configuration(&self, name: &str) -> ProvisionResult<String> {
        self.copied.lock().unwrap().push(name.to_string());
        Ok(format!("{}-copy", name))
    }
}

pub fn local_loader(resolver: Arc<dyn SecretResolver>) -> ConfigLoader {
    ConfigLoader::new(Arc::new(LocalDocumentStore::new()), resolver, local_source())
}

/// A launcher over the fixtures with `PrefixResolver`
pub fn fixture_launcher(provisioner: Arc<RecordingProvisioner>) -> Launcher {
    Launcher::new(local_loader(Arc::new(PrefixResolver)), provisioner)
}
