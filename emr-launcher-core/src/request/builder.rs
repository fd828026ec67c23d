//! Applies invocation payloads to a loaded document

use super::LaunchPayload;
use crate::document::{ConfigDocument, DocumentError, DocumentResult};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const STEPS_KEY: &str = "Steps";
pub const STEP_NAME_KEY: &str = "Name";
pub const HADOOP_JAR_STEP_KEY: &str = "HadoopJarStep";
pub const ARGS_KEY: &str = "Args";

/// Applies the three mutation channels of a payload, in order:
/// overrides, then extends, then additional step arguments.
///
/// Type errors abort the build. A step name with no matching step is
/// skipped.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    payload: &'a LaunchPayload,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(payload: &'a LaunchPayload) -> Self {
        Self { payload }
    }

    /// Apply the payload to `document`
    pub fn apply(&self, mut document: ConfigDocument) -> DocumentResult<ConfigDocument> {
        self.apply_overrides(&mut document);
        self.apply_extend(&mut document)?;
        self.apply_step_args(&mut document)?;
        Ok(document)
    }

    fn apply_overrides(&self, document: &mut ConfigDocument) {
        if let Some(overrides) = &self.payload.overrides {
            info!("Applying {} top-level overrides", overrides.len());
            document.override_with(overrides.clone());
        }
    }

    fn apply_extend(&self, document: &mut ConfigDocument) -> DocumentResult<()> {
        let Some(extend) = &self.payload.extend else {
            return Ok(());
        };

        for (path, value) in extend {
            let items = match value {
                Value::Array(items) => items.clone(),
                item => vec![item.clone()],
            };
            debug!("Extending {} with {} items", path, items.len());
            document.extend_nested_list(path, items)?;
        }
        Ok(())
    }

    fn apply_step_args(&self, document: &mut ConfigDocument) -> DocumentResult<()> {
        for (step_name, args) in self.payload.effective_step_args() {
            let replaced = document.try_find_replace(
                STEPS_KEY,
                STEP_NAME_KEY,
                &Value::String(step_name.clone()),
                |mut step| {
                    append_step_args(&mut step, &step_name, &args)?;
                    Ok(Some(step))
                },
            )?;

            if replaced {
                debug!("Added {} arguments to step {}", args.len(), step_name);
            } else {
                debug!("Step {} not found, skipping additional arguments", step_name);
            }
        }
        Ok(())
    }
}

/// Append `args` to the step's `HadoopJarStep.Args`.
///
/// A missing or non-sequence argument list is replaced by `args`.
fn append_step_args(step: &mut Value, step_name: &str, args: &[String]) -> DocumentResult<()> {
    let Some(step_map) = step.as_object_mut() else {
        return Ok(());
    };

    let jar_step = step_map
        .entry(HADOOP_JAR_STEP_KEY)
        .or_insert(Value::Null);
    if jar_step.is_null() {
        *jar_step = Value::Object(Map::new());
    }

    let jar_step = match jar_step {
        Value::Object(map) => map,
        other => {
            return Err(DocumentError::path_type(
                format!("{}[{}].{}", STEPS_KEY, step_name, HADOOP_JAR_STEP_KEY),
                "mapping",
                other,
            ))
        }
    };

    let new_args = args.iter().cloned().map(Value::String);
    match jar_step.get_mut(ARGS_KEY) {
        Some(Value::Array(existing)) => existing.extend(new_args),
        _ => {
            jar_step.insert(ARGS_KEY.to_string(), Value::Array(new_args.collect()));
        }
    }
    Ok(())
}
