//! Pass states: injection and reshaping without any resource callout.
//!
//! A Pass emits its literal `Result` when one is declared, otherwise its
//! (possibly parameterized) effective input, and routes the value through
//! the same pipeline tail as a Task. With no transforms configured a Pass is
//! the identity over data.

use serde_json::{Map, Value};

use crate::dataflow::{
    apply_input_path, apply_output_path, apply_result_path, evaluate_template,
    ResultDisposition,
};
use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::states::Transition;

/// A `Type: Pass` state.
#[derive(Debug, Clone)]
pub struct PassState {
    pub name: String,
    pub result: Option<Value>,
    pub parameters: Option<Value>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: ResultDisposition,
    pub comment: Option<String>,
    pub transition: Transition,
}

impl PassState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            name: name.to_string(),
            result: map.get("Result").cloned(),
            parameters: map.get("Parameters").cloned(),
            input_path: definition::opt_str(name, map, "InputPath")?,
            output_path: definition::opt_str(name, map, "OutputPath")?,
            result_path: ResultDisposition::from_def(name, map, "ResultPath")?,
            comment: definition::opt_str(name, map, "Comment")?,
            transition: Transition::from_def(name, map)?,
        })
    }

    pub(crate) fn execute(&self, input: &Value) -> Result<Value, ExecutionError> {
        let effective = apply_input_path(input, self.input_path.as_deref());
        let templated = match &self.parameters {
            Some(template) => evaluate_template(template, &effective),
            None => effective,
        };
        let raw = match &self.result {
            Some(result) => result.clone(),
            None => templated,
        };
        let placed = apply_result_path(input, raw, &self.result_path);
        Ok(apply_output_path(placed, self.output_path.as_deref()))
    }
}
