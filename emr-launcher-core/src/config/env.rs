//! Environment variable access for process settings

use super::error::{ConfigError, ConfigResult};
use std::str::FromStr;

/// Read-only view over a variable lookup function.
///
/// Empty and whitespace-only values are treated as unset.
pub(crate) struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> Env<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    /// Get a variable if set
    pub(crate) fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable, failing when it is not set
    pub(crate) fn required(&self, var: &str) -> ConfigResult<String> {
        self.optional(var).ok_or_else(|| ConfigError::EnvVarNotFound {
            var: var.to_string(),
        })
    }

    /// Get a variable or a default
    pub(crate) fn or_default(&self, var: &str, default: impl Into<String>) -> String {
        self.optional(var).unwrap_or_else(|| default.into())
    }

    /// Parse a variable, falling back to `default` when unset
    pub(crate) fn parse_or<T>(&self, var: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(var) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
                var: var.to_string(),
                value: value.clone(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_blank_values_are_unset() {
        let lookup = lookup_from(&[("BLANK", "   "), ("SET", " value ")]);
        let env = Env::new(&lookup);
        assert_eq!(env.optional("BLANK"), None);
        assert_eq!(env.optional("SET"), Some("value".to_string()));
    }

    #[test]
    fn test_missing_required_var() {
        let lookup = lookup_from(&[]);
        let env = Env::new(&lookup);
        assert_eq!(
            env.required("MISSING_VAR"),
            Err(ConfigError::EnvVarNotFound {
                var: "MISSING_VAR".to_string()
            })
        );
    }

    #[test]
    fn test_parse_or() {
        let lookup = lookup_from(&[("TIMEOUT", "45"), ("BAD", "soon")]);
        let env = Env::new(&lookup);
        assert_eq!(env.parse_or("TIMEOUT", 30u64), Ok(45));
        assert_eq!(env.parse_or("UNSET", 30u64), Ok(30));
        assert!(matches!(
            env.parse_or("BAD", 30u64),
            Err(ConfigError::InvalidVar { .. })
        ));
    }
}
