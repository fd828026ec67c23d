//! Process settings for the launcher
//!
//! Settings are read once at process start and passed explicitly to the
//! components that need them. Nothing below the entry point reads the
//! process environment.

mod env;
mod error;
mod secrets;

pub use error::{ConfigError, ConfigResult};
pub use secrets::{is_sensitive_field, redact_by_field_name, SafeLogging, SecretString, REDACTED};

use crate::loader::Fragment;
use crate::request::S3Overrides;
use crate::store::DocumentLocation;
use env::Env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, Level};

pub const CONFIG_DIR_VAR: &str = "EMR_LAUNCHER_CONFIG_DIR";
pub const CONFIG_S3_BUCKET_VAR: &str = "EMR_LAUNCHER_CONFIG_S3_BUCKET";
pub const CONFIG_S3_FOLDER_VAR: &str = "EMR_LAUNCHER_CONFIG_S3_FOLDER";
pub const LOG_LEVEL_VAR: &str = "EMR_LAUNCHER_LOG_LEVEL";
pub const S3_ENDPOINT_VAR: &str = "EMR_LAUNCHER_S3_ENDPOINT";
pub const EMR_ENDPOINT_VAR: &str = "EMR_LAUNCHER_EMR_ENDPOINT";
pub const SECRETS_ENDPOINT_VAR: &str = "EMR_LAUNCHER_SECRETS_ENDPOINT";
pub const SECRETS_EXTENSION_PORT_VAR: &str = "PARAMETERS_SECRETS_EXTENSION_HTTP_PORT";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const HTTP_TIMEOUT_VAR: &str = "EMR_LAUNCHER_HTTP_TIMEOUT_SECS";

const DEFAULT_SECRETS_EXTENSION_PORT: &str = "2773";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where configuration fragments are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `<dir>/<fragment>.yaml` on the local filesystem
    Local { dir: PathBuf },
    /// `<folder>/<fragment>.yaml` in an object-store bucket
    ObjectStore { bucket: String, folder: String },
}

impl ConfigSource {
    /// The location of a fragment within this source
    pub fn locate(&self, fragment: Fragment) -> DocumentLocation {
        match self {
            ConfigSource::Local { dir } => DocumentLocation::Path(dir.join(fragment.file_name())),
            ConfigSource::ObjectStore { bucket, folder } => {
                let folder = folder.trim_matches('/');
                let key = if folder.is_empty() {
                    fragment.file_name()
                } else {
                    format!("{}/{}", folder, fragment.file_name())
                };
                DocumentLocation::Object {
                    bucket: bucket.clone(),
                    key,
                }
            }
        }
    }

    /// The source to use for one call, with bucket/folder overrides applied.
    ///
    /// Overrides only apply to the object-store source.
    pub fn with_overrides(&self, overrides: &S3Overrides) -> ConfigSource {
        match self {
            ConfigSource::ObjectStore { bucket, folder } => ConfigSource::ObjectStore {
                bucket: overrides.bucket.clone().unwrap_or_else(|| bucket.clone()),
                folder: overrides.folder.clone().unwrap_or_else(|| folder.clone()),
            },
            ConfigSource::Local { dir } => {
                if !overrides.is_empty() {
                    debug!(
                        "Ignoring s3 overrides for local config dir {}",
                        dir.display()
                    );
                }
                self.clone()
            }
        }
    }
}

/// Settings for one launcher process
#[derive(Debug, Clone)]
pub struct LauncherSettings {
    /// Fragment source
    pub source: ConfigSource,

    /// Log level for the subscriber installed by the entry point
    pub log_level: Level,

    /// Object-store endpoint (path-style requests), set for the object-store source
    pub s3_endpoint: Option<String>,

    /// Provisioning API endpoint. Requests are not signed, so this must be a
    /// signing proxy or an emulator.
    pub emr_endpoint: String,

    /// Secrets extension endpoint
    pub secrets_endpoint: String,

    /// Token presented to the secrets extension
    pub secrets_token: Option<SecretString>,

    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl LauncherSettings {
    /// Read settings from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env::new(&lookup);

        let (source, s3_endpoint) = match env.optional(CONFIG_DIR_VAR) {
            Some(dir) => (
                ConfigSource::Local {
                    dir: PathBuf::from(dir),
                },
                None,
            ),
            None => (
                ConfigSource::ObjectStore {
                    bucket: env.required(CONFIG_S3_BUCKET_VAR)?,
                    folder: env.or_default(CONFIG_S3_FOLDER_VAR, ""),
                },
                Some(env.required(S3_ENDPOINT_VAR)?),
            ),
        };

        let log_level = parse_log_level(&env.or_default(LOG_LEVEL_VAR, "INFO"))?;
        let emr_endpoint = env.required(EMR_ENDPOINT_VAR)?;
        let secrets_endpoint = match env.optional(SECRETS_ENDPOINT_VAR) {
            Some(endpoint) => endpoint,
            None => format!(
                "http://localhost:{}",
                env.or_default(SECRETS_EXTENSION_PORT_VAR, DEFAULT_SECRETS_EXTENSION_PORT)
            ),
        };

        let secrets_token = env.optional(SESSION_TOKEN_VAR).map(SecretString::new);
        let timeout_secs = env.parse_or(HTTP_TIMEOUT_VAR, DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: format!("{} must be greater than zero", HTTP_TIMEOUT_VAR),
            });
        }

        Ok(Self {
            source,
            log_level,
            s3_endpoint,
            emr_endpoint,
            secrets_endpoint,
            secrets_token,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse a log level name, accepting the usual aliases in any case
pub fn parse_log_level(value: &str) -> ConfigResult<Level> {
    match value.trim().to_uppercase().as_str() {
        "TRACE" | "NOTSET" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" | "CRITICAL" | "FATAL" => Ok(Level::ERROR),
        _ => Err(ConfigError::InvalidVar {
            var: LOG_LEVEL_VAR.to_string(),
            value: value.to_string(),
            message: "invalid log level".to_string(),
        }),
    }
}
