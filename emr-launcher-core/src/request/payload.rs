//! Invocation payload parsing

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Steps that receive the legacy correlation arguments
const LEGACY_STEP_NAMES: [&str; 2] = ["source", "submit-job"];

/// The invocation payload does not have the expected shape
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Malformed payload: {message}")]
    Malformed { message: String },
}

impl PayloadError {
    fn malformed(message: impl Into<String>) -> Self {
        PayloadError::Malformed {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        PayloadError::malformed(err.to_string())
    }
}

/// Result type for payload parsing
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Bucket/folder overrides for the fragment source of one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct S3Overrides {
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default)]
    pub folder: Option<String>,
}

impl S3Overrides {
    pub fn is_empty(&self) -> bool {
        self.bucket.is_none() && self.folder.is_none()
    }
}

/// Caller customisations for one cluster launch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LaunchPayload {
    /// Deep-merged into the loaded document
    #[serde(default)]
    pub overrides: Option<Map<String, Value>>,

    /// Path to an item or list of items appended to the sequence at that path
    #[serde(default)]
    pub extend: Option<Map<String, Value>>,

    /// Step name to arguments appended to that step
    #[serde(default)]
    pub additional_step_args: Option<BTreeMap<String, Vec<String>>>,

    /// Fragment source overrides for this call
    #[serde(default)]
    pub s3_overrides: Option<S3Overrides>,

    /// Copy the document's security configuration before submitting
    #[serde(default)]
    pub copy_secconfig: bool,

    /// Tags added to the cluster after submission
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,

    /// Legacy correlation id, paired with `s3_prefix`
    #[serde(default)]
    pub correlation_id: Option<String>,

    /// Legacy S3 prefix, paired with `correlation_id`
    #[serde(default)]
    pub s3_prefix: Option<String>,
}

impl LaunchPayload {
    /// Parse an invocation event.
    ///
    /// A notification event (`Records[0].Sns.Message`) carries the payload
    /// as a JSON string; any other mapping is the payload itself. A `null`
    /// event is an empty payload.
    pub fn from_event(event: &Value) -> PayloadResult<Self> {
        match event {
            Value::Null => Ok(Self::default()),
            Value::Object(map) if map.contains_key("Records") => {
                let message = notification_message(map)?;
                let payload: Value = serde_json::from_str(message)?;
                match payload {
                    Value::Null => Ok(Self::default()),
                    Value::Object(_) => Ok(serde_json::from_value(payload)?),
                    _ => Err(PayloadError::malformed(
                        "notification message must be a JSON object",
                    )),
                }
            }
            Value::Object(_) => Ok(serde_json::from_value(event.clone())?),
            _ => Err(PayloadError::malformed("event must be a JSON object")),
        }
    }

    /// Additional step arguments including the legacy correlation arguments.
    ///
    /// When both `correlation_id` and `s3_prefix` are set, the `source` and
    /// `submit-job` steps get `--correlation_id <id> --s3_prefix <prefix>`
    /// after any explicit arguments.
    pub fn effective_step_args(&self) -> BTreeMap<String, Vec<String>> {
        let mut step_args = self.additional_step_args.clone().unwrap_or_default();

        if let (Some(correlation_id), Some(s3_prefix)) = (&self.correlation_id, &self.s3_prefix) {
            for step_name in LEGACY_STEP_NAMES {
                step_args.entry(step_name.to_string()).or_default().extend([
                    "--correlation_id".to_string(),
                    correlation_id.clone(),
                    "--s3_prefix".to_string(),
                    s3_prefix.clone(),
                ]);
            }
        }

        step_args
    }

    /// Tags to add after submission
    pub fn tags(&self) -> BTreeMap<String, String> {
        self.tags.clone().unwrap_or_default()
    }
}

fn notification_message(event: &Map<String, Value>) -> PayloadResult<&str> {
    event
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .and_then(|record| record.get("Sns"))
        .and_then(|sns| sns.get("Message"))
        .and_then(Value::as_str)
        .ok_or_else(|| PayloadError::malformed("notification event has no Records[0].Sns.Message"))
}
