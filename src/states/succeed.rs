//! Succeed states: deliberate successful termination.

use serde_json::{Map, Value};

use crate::dataflow::{apply_input_path, apply_output_path};
use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;

/// A `Type: Succeed` state. Terminal; carries neither `Next` nor `End`.
#[derive(Debug, Clone)]
pub struct SucceedState {
    pub name: String,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub comment: Option<String>,
}

impl SucceedState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: name.to_string(),
            input_path: definition::opt_str(name, map, "InputPath")?,
            output_path: definition::opt_str(name, map, "OutputPath")?,
            comment: definition::opt_str(name, map, "Comment")?,
        })
    }

    pub(crate) fn execute(&self, input: &Value) -> Result<Value, ExecutionError> {
        let effective = apply_input_path(input, self.input_path.as_deref());
        Ok(apply_output_path(effective, self.output_path.as_deref()))
    }
}
