//! Fail states: deliberate failed termination with caller-chosen codes.

use serde_json::{Map, Value};

use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;

/// A `Type: Fail` state. Terminal; requires non-empty `Error` and `Cause`.
#[derive(Debug, Clone)]
pub struct FailState {
    pub name: String,
    pub error: String,
    pub cause: String,
    pub comment: Option<String>,
}

impl FailState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: name.to_string(),
            error: definition::req_str(name, map, "Error")?,
            cause: definition::req_str(name, map, "Cause")?,
            comment: definition::opt_str(name, map, "Comment")?,
        })
    }

    /// Input passes through unchanged so the history records what arrived.
    pub(crate) fn execute(&self, input: &Value) -> Result<Value, ExecutionError> {
        Ok(input.clone())
    }
}
