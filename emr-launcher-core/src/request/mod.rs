//! Invocation payloads and the request builder
//!
//! A [`LaunchPayload`] carries the caller's customisations for one launch;
//! [`RequestBuilder`] applies them to the loaded document in a fixed order.

mod builder;
mod payload;

pub use builder::{RequestBuilder, ARGS_KEY, HADOOP_JAR_STEP_KEY, STEPS_KEY, STEP_NAME_KEY};
pub use payload::{LaunchPayload, PayloadError, PayloadResult, S3Overrides};
