//! The data-flow pipeline threading values between states.
//!
//! States that participate in data flow compose up to five transforms around
//! their behavior:
//!
//! 1. `InputPath` narrows the state input to an *effective input*.
//! 2. `Parameters` templates a fresh value from the effective input, routing
//!    string leaves through the intrinsic evaluator.
//! 3. The state's behavior produces a raw result.
//! 4. `ResultSelector` templates over the raw result.
//! 5. `ResultPath` places the selected result back into the original input.
//! 6. `OutputPath` wraps the placed value as the single entry of an
//!    otherwise empty object.
//!
//! The functions here are pure over `serde_json::Value`; the state modules
//! own sequencing.

use serde_json::{Map, Value};

use crate::definition::{self, DefinitionError};
use crate::intrinsics;
use crate::paths::{get_at, set_at};

/// Apply `InputPath`: `None` leaves the input untouched, a path narrows the
/// input to the addressed value, and a path that resolves to null yields an
/// empty object.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use stateweave::dataflow::apply_input_path;
///
/// let input = json!({"order": {"total": 99}, "noise": true});
/// assert_eq!(apply_input_path(&input, None), input);
/// assert_eq!(apply_input_path(&input, Some("$.order")), json!({"total": 99}));
/// assert_eq!(apply_input_path(&input, Some("$.absent")), json!({}));
/// ```
#[must_use]
pub fn apply_input_path(input: &Value, input_path: Option<&str>) -> Value {
    match input_path {
        None => input.clone(),
        Some(path) => match get_at(input, path) {
            Value::Null => Value::Object(Map::new()),
            value => value,
        },
    }
}

/// Deep-walk a parameter template, resolving string leaves through the
/// intrinsic evaluator with `data` as the resolution root.
///
/// Objects and arrays recurse; numbers, booleans, and nulls pass through
/// untouched.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use stateweave::dataflow::evaluate_template;
///
/// let data = json!({"id": 7});
/// let template = json!({"order": "$.id", "tag": "States.Format('o-{}', $.id)"});
/// assert_eq!(
///     evaluate_template(&template, &data),
///     json!({"order": 7, "tag": "o-7"}),
/// );
/// ```
#[must_use]
pub fn evaluate_template(template: &Value, data: &Value) -> Value {
    match template {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), evaluate_template(value, data)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items.iter().map(|item| evaluate_template(item, data)).collect(),
        ),
        Value::String(text) => intrinsics::evaluate(text, data),
        other => other.clone(),
    }
}

/// Where a state's result lands relative to its original input.
///
/// Parsed from the `ResultPath` field: an absent field or the literal `"$"`
/// replace the input wholesale, an explicit JSON `null` discards the result,
/// and any other path deep-merges the result into a copy of the input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultDisposition {
    /// The result replaces the input (`ResultPath` absent or `"$"`).
    #[default]
    Replace,
    /// The result is discarded and the original input flows on
    /// (`ResultPath: null`).
    Discard,
    /// The result is merged into the input at the given path.
    At(String),
}

impl ResultDisposition {
    /// Parse the `ResultPath` field of a state definition.
    pub(crate) fn from_def(
        state: &str,
        map: &Map<String, Value>,
        field: &'static str,
    ) -> Result<Self, DefinitionError> {
        match map.get(field) {
            None => Ok(Self::Replace),
            Some(Value::Null) => Ok(Self::Discard),
            Some(Value::String(path)) if path.trim() == "$" => Ok(Self::Replace),
            Some(Value::String(path)) => Ok(Self::At(path.clone())),
            Some(other) => Err(definition::invalid_field(
                state,
                field,
                format!("expected a path string or null, found {other}"),
            )),
        }
    }
}

/// Apply `ResultPath`: place `result` into `input` per the disposition.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use stateweave::dataflow::{apply_result_path, ResultDisposition};
///
/// let input = json!({"kept": 1});
/// let at = ResultDisposition::At("$.out".to_string());
/// assert_eq!(
///     apply_result_path(&input, json!({"r": 2}), &at),
///     json!({"kept": 1, "out": {"r": 2}}),
/// );
/// assert_eq!(
///     apply_result_path(&input, json!({"r": 2}), &ResultDisposition::Discard),
///     json!({"kept": 1}),
/// );
/// ```
#[must_use]
pub fn apply_result_path(
    input: &Value,
    result: Value,
    disposition: &ResultDisposition,
) -> Value {
    match disposition {
        ResultDisposition::Replace => result,
        ResultDisposition::Discard => input.clone(),
        ResultDisposition::At(path) => set_at(input, path, result),
    }
}

/// Apply `OutputPath`: `None` passes `placed` through, a path makes `placed`
/// the value at that path inside an otherwise empty object.
#[must_use]
pub fn apply_output_path(placed: Value, output_path: Option<&str>) -> Value {
    match output_path {
        None => placed,
        Some(path) => set_at(&Value::Object(Map::new()), path, placed),
    }
}
