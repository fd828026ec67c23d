//! Cluster configuration document
//!
//! A [`ConfigDocument`] is the in-memory tree of a cluster-launch request:
//! string-keyed mappings, ordered sequences and scalars. Nodes are addressed
//! by dot-separated paths of mapping keys (`Instances.InstanceFleets`);
//! sequences are never indexed by a path.
//!
//! The document is exclusively owned by the build that created it and is
//! mutated in place by the merge, find-replace and extend operations.

mod error;
mod merge;

pub use error::{kind_of, DocumentError, DocumentResult};

use crate::config::{redact_by_field_name, SafeLogging};
use crate::store::{DocumentLocation, DocumentStore};
use serde_json::{Map, Value};
use std::fmt;

/// Expected kind reported when a find-replace function returns no item
const REPLACEMENT_KIND: &str = "non-null replacement item";

/// The cluster-launch request being assembled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing mapping
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Wrap a parsed value, which must be a mapping
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(DocumentError::path_type("", "mapping", &other)),
        }
    }

    /// Parse a YAML document whose root is a mapping.
    ///
    /// Any parse failure, including a non-mapping root, is reported as
    /// `ConfigNotFound` for `location`.
    pub fn from_yaml_str(content: &str, location: &str) -> DocumentResult<Self> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|e| DocumentError::ConfigNotFound {
                location: location.to_string(),
                reason: e.to_string(),
            })?;

        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(DocumentError::ConfigNotFound {
                location: location.to_string(),
                reason: format!("document root is a {}, expected a mapping", kind_of(&other)),
            }),
        }
    }

    /// Fetch and parse a document from a store.
    ///
    /// Every store failure surfaces as `ConfigNotFound`, whatever the store's
    /// own failure mode was.
    pub async fn from_store(
        store: &dyn DocumentStore,
        location: &DocumentLocation,
    ) -> DocumentResult<Self> {
        let content = store
            .fetch(location)
            .await
            .map_err(|e| DocumentError::ConfigNotFound {
                location: location.to_string(),
                reason: e.to_string(),
            })?;

        Self::from_yaml_str(&content, &location.to_string())
    }

    /// Borrow the root mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Consume the document, returning the root mapping
    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }

    /// Consume the document, returning it as a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Get a top-level value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Set a top-level value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.root.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Resolve a dot-separated path by strict key descent.
    ///
    /// Returns `None` when a segment is missing or an intermediate node is
    /// not a mapping. Never fails.
    pub fn get_nested_node(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    fn get_nested_node_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut node = self.root.get_mut(segments.next()?)?;
        for segment in segments {
            node = node.as_object_mut()?.get_mut(segment)?;
        }
        Some(node)
    }

    /// Insert `value` at `path`.
    ///
    /// The parent must already exist and be a mapping; intermediate mappings
    /// are never created. A path holding a non-null value is left untouched
    /// and reported as `PathExists`. Empty segments (`"Instances."`) are an
    /// `InvalidPath` error.
    pub fn insert_nested_node(&mut self, path: &str, value: Value) -> DocumentResult<()> {
        if path.split('.').any(str::is_empty) {
            return Err(DocumentError::InvalidPath {
                path: path.to_string(),
            });
        }

        if !matches!(self.get_nested_node(path), None | Some(Value::Null)) {
            return Err(DocumentError::PathExists {
                path: path.to_string(),
            });
        }

        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (Some(parent), key),
            None => (None, path),
        };

        let parent_map = match parent {
            None => &mut self.root,
            Some(parent_path) => match self.get_nested_node_mut(parent_path) {
                Some(Value::Object(map)) => map,
                Some(other) => return Err(DocumentError::path_type(parent_path, "mapping", other)),
                None => {
                    return Err(DocumentError::ParentNotFound {
                        path: path.to_string(),
                    })
                }
            },
        };

        parent_map.insert(key.to_string(), value);
        Ok(())
    }

    /// Find the first item of the sequence at `path` whose `condition_key`
    /// equals `condition_value`.
    ///
    /// An absent path yields `Ok(None)`; a non-sequence node is a `PathType`
    /// error.
    pub fn find_item(
        &self,
        path: &str,
        condition_key: &str,
        condition_value: &Value,
    ) -> DocumentResult<Option<&Value>> {
        match self.get_nested_node(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .find(|item| item_matches(item, condition_key, condition_value))),
            Some(other) => Err(DocumentError::path_type(path, "sequence", other)),
        }
    }

    /// Replace the first matching item of the sequence at `path`.
    ///
    /// `replace` receives a copy of the item and must return its replacement;
    /// returning `None` or `null` is a `PathType` error and leaves the
    /// sequence untouched. The replacement goes into the original index so the
    /// order of every other item is preserved.
    ///
    /// Returns whether an item was replaced. An absent path or no matching
    /// item is a no-op.
    pub fn find_replace<F>(
        &mut self,
        path: &str,
        condition_key: &str,
        condition_value: &Value,
        replace: F,
    ) -> DocumentResult<bool>
    where
        F: FnOnce(Value) -> Option<Value>,
    {
        self.try_find_replace(path, condition_key, condition_value, |item| Ok(replace(item)))
    }

    /// [`find_replace`](Self::find_replace) with a fallible replacement function
    pub fn try_find_replace<F>(
        &mut self,
        path: &str,
        condition_key: &str,
        condition_value: &Value,
        replace: F,
    ) -> DocumentResult<bool>
    where
        F: FnOnce(Value) -> DocumentResult<Option<Value>>,
    {
        let items = match self.get_nested_node_mut(path) {
            None | Some(Value::Null) => return Ok(false),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(DocumentError::path_type(path, "sequence", other)),
        };

        let Some(index) = items
            .iter()
            .position(|item| item_matches(item, condition_key, condition_value))
        else {
            return Ok(false);
        };

        match replace(items[index].clone())? {
            None | Some(Value::Null) => {
                Err(DocumentError::path_type(path, REPLACEMENT_KIND, &Value::Null))
            }
            Some(replacement) => {
                items[index] = replacement;
                Ok(true)
            }
        }
    }

    /// Deep-merge `other` into this document.
    ///
    /// Mappings merge recursively; everything else, sequences included, is
    /// replaced wholesale.
    pub fn override_with(&mut self, other: Map<String, Value>) {
        merge::deep_merge(&mut self.root, other);
    }

    /// Shallow merge: each top-level key of `other` replaces the same key here
    pub fn update(&mut self, other: ConfigDocument) {
        merge::shallow_merge(&mut self.root, other.root);
    }

    /// Append `items` to the sequence at `path`, creating it when absent.
    ///
    /// Creation goes through [`insert_nested_node`](Self::insert_nested_node),
    /// so the parent must exist. A non-sequence node is a `PathType` error.
    pub fn extend_nested_list(&mut self, path: &str, items: Vec<Value>) -> DocumentResult<()> {
        match self.get_nested_node_mut(path) {
            Some(Value::Array(existing)) => {
                existing.extend(items);
                Ok(())
            }
            None | Some(Value::Null) => self.insert_nested_node(path, Value::Array(items)),
            Some(other) => Err(DocumentError::path_type(path, "sequence", other)),
        }
    }

    /// A copy of the document with sensitive scalar values redacted
    pub fn redacted(&self) -> Value {
        redact_mapping(&self.root)
    }
}

fn item_matches(item: &Value, condition_key: &str, condition_value: &Value) -> bool {
    item.as_object()
        .and_then(|map| map.get(condition_key))
        .is_some_and(|value| value == condition_value)
}

fn redact_mapping(map: &Map<String, Value>) -> Value {
    let redacted = map
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(redact_by_field_name(key, s)),
                other => redact_value(other),
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(redacted)
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => redact_mapping(map),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(root: Map<String, Value>) -> Self {
        Self::from_map(root)
    }
}

impl SafeLogging for ConfigDocument {
    fn safe_for_logging(&self) -> String {
        self.redacted().to_string()
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.safe_for_logging())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_get_nested_node() {
        let document = doc(json!({"Instances": {"Ec2SubnetId": "subnet-1"}}));
        assert_eq!(
            document.get_nested_node("Instances.Ec2SubnetId"),
            Some(&json!("subnet-1"))
        );
        assert_eq!(document.get_nested_node("Instances.Missing"), None);
        assert_eq!(document.get_nested_node("Instances.Ec2SubnetId.Deeper"), None);
    }

    #[test]
    fn test_get_nested_node_does_not_index_sequences() {
        let document = doc(json!({"Steps": [{"Name": "a"}]}));
        assert_eq!(document.get_nested_node("Steps.0"), None);
        assert_eq!(document.get_nested_node("Steps.Name"), None);
    }

    #[test]
    fn test_insert_top_level_key() {
        let mut document = ConfigDocument::new();
        document.insert_nested_node("Name", json!("cluster")).unwrap();
        assert_eq!(document.get("Name"), Some(&json!("cluster")));
    }

    #[test]
    fn test_insert_over_null_value() {
        let mut document = doc(json!({"Instances": {"Ec2SubnetId": null}}));
        document
            .insert_nested_node("Instances.Ec2SubnetId", json!("subnet-2"))
            .unwrap();
        assert_eq!(
            document.get_nested_node("Instances.Ec2SubnetId"),
            Some(&json!("subnet-2"))
        );
    }

    #[test]
    fn test_insert_into_scalar_parent_fails() {
        let mut document = doc(json!({"Name": "cluster"}));
        let err = document.insert_nested_node("Name.Child", json!(1)).unwrap_err();
        assert!(matches!(err, DocumentError::PathType { expected: "mapping", .. }));
    }

    #[test]
    fn test_find_replace_skips_items_without_condition_key() {
        let mut document = doc(json!({"Configurations": [
            "not-a-mapping",
            {"Properties": {}},
            {"Classification": "yarn-site"}
        ]}));
        let replaced = document
            .find_replace("Configurations", "Classification", &json!("yarn-site"), |_| {
                Some(json!({"Classification": "yarn-site", "Properties": {"k": "v"}}))
            })
            .unwrap();
        assert!(replaced);
        assert_eq!(
            document.get("Configurations"),
            Some(&json!([
                "not-a-mapping",
                {"Properties": {}},
                {"Classification": "yarn-site", "Properties": {"k": "v"}}
            ]))
        );
    }

    #[test]
    fn test_find_replace_null_replacement_leaves_document() {
        let mut document = doc(json!({"Steps": [{"Name": "a"}, {"Name": "b"}]}));
        let before = document.clone();
        let err = document
            .find_replace("Steps", "Name", &json!("a"), |_| None)
            .unwrap_err();
        assert!(matches!(err, DocumentError::PathType { actual: "null", .. }));
        assert_eq!(document, before);

        let err = document
            .find_replace("Steps", "Name", &json!("a"), |_| Some(Value::Null))
            .unwrap_err();
        assert!(matches!(err, DocumentError::PathType { actual: "null", .. }));
        assert_eq!(document, before);
    }

    #[test]
    fn test_try_find_replace_propagates_error() {
        let mut document = doc(json!({"Steps": [{"Name": "a"}]}));
        let err = document
            .try_find_replace("Steps", "Name", &json!("a"), |_| {
                Err(DocumentError::PathExists {
                    path: "Steps".to_string(),
                })
            })
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::PathExists {
                path: "Steps".to_string()
            }
        );
    }

    #[test]
    fn test_find_item_on_scalar_fails() {
        let document = doc(json!({"Name": "cluster"}));
        assert!(document.find_item("Name", "Name", &json!("x")).is_err());
        assert_eq!(document.find_item("Missing", "Name", &json!("x")), Ok(None));
    }

    #[test]
    fn test_extend_without_parent_fails() {
        let mut document = ConfigDocument::new();
        let err = document
            .extend_nested_list("Instances.InstanceFleets", vec![json!({"Name": "CORE"})])
            .unwrap_err();
        assert!(matches!(err, DocumentError::ParentNotFound { .. }));
        assert!(document.is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_non_mapping_root() {
        let err = ConfigDocument::from_yaml_str("- a\n- b\n", "steps.yaml").unwrap_err();
        assert!(err.is_not_found());

        let err = ConfigDocument::from_yaml_str("", "steps.yaml").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_redacted_hides_passwords() {
        let document = doc(json!({
            "Name": "cluster",
            "Configurations": [{
                "Classification": "hive-site",
                "Properties": {"javax.jdo.option.ConnectionPassword": "hunter2"}
            }]
        }));
        let redacted = document.redacted();
        assert_eq!(
            redacted["Configurations"][0]["Properties"]["javax.jdo.option.ConnectionPassword"],
            json!("[REDACTED]")
        );
        assert_eq!(redacted["Name"], json!("cluster"));
        assert!(!document.to_string().contains("hunter2"));
    }
}
