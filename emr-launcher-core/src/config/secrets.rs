//! Secret values and redaction for logging
//!
//! This module provides:
//! - A `SecretString` wrapper that never prints its value
//! - Field-name based redaction used when logging documents
//! - The `SafeLogging` trait for values with a redacted representation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written in place of sensitive values
pub const REDACTED: &str = "[REDACTED]";

/// A wrapper type for sensitive strings like resolved passwords
#[derive(Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the actual value (use with caution)
    pub fn expose_secret(&self) -> &str {
        &self.value
    }

    /// Consume the wrapper, returning the value
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", REDACTED)
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A trait for types that can be logged safely
pub trait SafeLogging {
    /// Returns a safe version for logging
    fn safe_for_logging(&self) -> String;
}

const SENSITIVE_PATTERNS: [&str; 7] = [
    "password",
    "secret",
    "token",
    "credential",
    "passphrase",
    "private",
    "api_key",
];

/// Whether a field name looks like it holds a sensitive value
pub fn is_sensitive_field(field_name: &str) -> bool {
    let field_lower = field_name.to_lowercase();
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| field_lower.contains(pattern))
}

/// Redact a string based on field name patterns
pub fn redact_by_field_name(field_name: &str, value: &str) -> String {
    if is_sensitive_field(field_name) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redaction() {
        let secret = SecretString::new("resolved-password");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::new("my-secret-value");
        assert_eq!(secret.expose_secret(), "my-secret-value");
        assert_eq!(secret.into_inner(), "my-secret-value");
    }

    #[test]
    fn test_redact_by_field_name() {
        assert_eq!(
            redact_by_field_name("javax.jdo.option.ConnectionPassword", "pw"),
            "[REDACTED]"
        );
        assert_eq!(redact_by_field_name("Name", "cluster"), "cluster");
        assert_eq!(redact_by_field_name("SessionToken", "abc"), "[REDACTED]");
        assert_eq!(
            redact_by_field_name("javax.jdo.option.ConnectionUserName", "hive"),
            "hive"
        );
    }
}
