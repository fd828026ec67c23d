//! Configuration loader
//!
//! Fetches the four configuration fragments from the document store and
//! folds them into one document in a fixed order:
//!
//! 1. `cluster` (required)
//! 2. `configurations` (optional), followed by secret resolution
//! 3. `instances` (required)
//! 4. `steps` (optional)
//!
//! Folding is a shallow, top-level merge: a later fragment's key replaces the
//! same key from every earlier fragment.

use crate::config::{ConfigSource, SafeLogging};
use crate::document::{ConfigDocument, DocumentResult};
use crate::request::S3Overrides;
use crate::resolver::SecretResolver;
use crate::store::DocumentStore;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const CONFIGURATIONS_KEY: &str = "Configurations";
pub const CLASSIFICATION_KEY: &str = "Classification";
pub const PROPERTIES_KEY: &str = "Properties";
pub const CONNECTION_PASSWORD_PROPERTY: &str = "javax.jdo.option.ConnectionPassword";

/// Classifications whose connection password names a secret
pub const SECRET_CLASSIFICATIONS: [&str; 2] = ["spark-hive-site", "hive-site"];

/// A named category of configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    Cluster,
    Configurations,
    Instances,
    Steps,
}

impl Fragment {
    /// All fragments in fold order
    pub const ALL: [Fragment; 4] = [
        Fragment::Cluster,
        Fragment::Configurations,
        Fragment::Instances,
        Fragment::Steps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fragment::Cluster => "cluster",
            Fragment::Configurations => "configurations",
            Fragment::Instances => "instances",
            Fragment::Steps => "steps",
        }
    }

    /// File name of the fragment within a source
    pub fn file_name(&self) -> String {
        format!("{}.yaml", self.name())
    }

    /// Whether a launch fails when this fragment is absent
    pub fn is_required(&self) -> bool {
        matches!(self, Fragment::Cluster | Fragment::Instances)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Loads and folds configuration fragments
#[derive(Clone)]
pub struct ConfigLoader {
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn SecretResolver>,
    source: ConfigSource,
}

impl ConfigLoader {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn SecretResolver>,
        source: ConfigSource,
    ) -> Self {
        Self {
            store,
            resolver,
            source,
        }
    }

    /// The source fragments are read from
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// A loader for one call with bucket/folder overrides applied
    pub fn with_overrides(&self, overrides: &S3Overrides) -> ConfigLoader {
        ConfigLoader {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            source: self.source.with_overrides(overrides),
        }
    }

    /// Read one fragment.
    ///
    /// A fragment that cannot be fetched or parsed is a `ConfigNotFound`
    /// error when `required`, and `Ok(None)` otherwise.
    pub async fn read_config(
        &self,
        fragment: Fragment,
        required: bool,
    ) -> DocumentResult<Option<ConfigDocument>> {
        let location = self.source.locate(fragment);
        info!("Locating {} config at {}", fragment, location);

        match ConfigDocument::from_store(self.store.as_ref(), &location).await {
            Ok(document) => {
                debug!("{} config: {}", fragment, document.safe_for_logging());
                Ok(Some(document))
            }
            Err(err) if !required && err.is_not_found() => {
                debug!("Config type {} not found: {}", fragment, err);
                Ok(None)
            }
            Err(err) => {
                error!("Failed to read {} config: {}", fragment, err);
                Err(err)
            }
        }
    }

    /// Load all fragments and fold them into one document
    pub async fn build_config(&self) -> DocumentResult<ConfigDocument> {
        let mut document = ConfigDocument::new();

        for fragment in Fragment::ALL {
            self.fold_fragment(&mut document, fragment).await?;
            // Secrets resolve once, as soon as the configurations are in
            if fragment == Fragment::Configurations {
                self.resolve_secrets(&mut document).await?;
            }
        }

        Ok(document)
    }

    async fn fold_fragment(
        &self,
        document: &mut ConfigDocument,
        fragment: Fragment,
    ) -> DocumentResult<()> {
        if let Some(loaded) = self.read_config(fragment, fragment.is_required()).await? {
            document.update(loaded);
        }
        Ok(())
    }

    /// Replace the connection password of each secret-bearing classification
    /// with the secret it names.
    ///
    /// Lookup failures are logged and leave the property as it was.
    pub async fn resolve_secrets(&self, document: &mut ConfigDocument) -> DocumentResult<()> {
        for classification in SECRET_CLASSIFICATIONS {
            let condition = Value::String(classification.to_string());

            let secret_id = {
                let Some(item) =
                    document.find_item(CONFIGURATIONS_KEY, CLASSIFICATION_KEY, &condition)?
                else {
                    continue;
                };

                match item
                    .get(PROPERTIES_KEY)
                    .and_then(|properties| properties.get(CONNECTION_PASSWORD_PROPERTY))
                {
                    Some(Value::String(secret_id)) => secret_id.clone(),
                    Some(_) => {
                        warn!(
                            "{} {} is not a string, leaving it unresolved",
                            classification, CONNECTION_PASSWORD_PROPERTY
                        );
                        continue;
                    }
                    None => {
                        debug!("{} has no {}", classification, CONNECTION_PASSWORD_PROPERTY);
                        continue;
                    }
                }
            };

            let secret = match self.resolver.resolve(&secret_id).await {
                Ok(Some(secret)) => secret,
                Ok(None) => {
                    warn!("{} Secret not found in secret store", secret_id);
                    continue;
                }
                Err(err) => {
                    warn!("{} Secret could not be resolved: {}", secret_id, err);
                    continue;
                }
            };

            document.find_replace(CONFIGURATIONS_KEY, CLASSIFICATION_KEY, &condition, |mut item| {
                if let Some(Value::Object(properties)) = item.get_mut(PROPERTIES_KEY) {
                    properties.insert(
                        CONNECTION_PASSWORD_PROPERTY.to_string(),
                        Value::String(secret.into_inner()),
                    );
                }
                Some(item)
            })?;
            info!("Resolved {} connection password", classification);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_names() {
        let names: Vec<String> = Fragment::ALL.iter().map(Fragment::file_name).collect();
        assert_eq!(
            names,
            vec!["cluster.yaml", "configurations.yaml", "instances.yaml", "steps.yaml"]
        );
    }

    #[test]
    fn test_required_fragments() {
        assert!(Fragment::Cluster.is_required());
        assert!(Fragment::Instances.is_required());
        assert!(!Fragment::Configurations.is_required());
        assert!(!Fragment::Steps.is_required());
    }
}
