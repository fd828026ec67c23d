//! Document error types

use serde_json::Value;
use thiserror::Error;

/// Errors raised by path-addressed document operations and document loading
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A configuration document could not be fetched or parsed
    #[error("Config not found at '{location}': {reason}")]
    ConfigNotFound { location: String, reason: String },

    /// The node at a path exists but has the wrong type
    #[error("Path '{path}' does not correspond to a {expected} (found {actual})")]
    PathType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// `insert_nested_node` was called on a path that already holds a value
    #[error("Path '{path}' already exists")]
    PathExists { path: String },

    /// The parent of an inserted node does not exist
    #[error("Parent of path '{path}' does not exist")]
    ParentNotFound { path: String },

    /// A path with an empty segment
    #[error("Path '{path}' has an empty segment")]
    InvalidPath { path: String },
}

impl DocumentError {
    /// Helper to create a type error for the node found at `path`
    pub fn path_type(path: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self::PathType {
            path: path.into(),
            expected,
            actual: kind_of(found),
        }
    }

    /// Whether this is a `ConfigNotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. })
    }
}

/// Short human name for the kind of a node
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
