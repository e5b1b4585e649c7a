//! Typed access to parsed definition documents.
//!
//! A state-machine definition arrives as an already-parsed
//! [`serde_json::Value`] tree (the text loaders live at the crate edge, see
//! [`crate::machine`]). The helpers here extract required and optional fields
//! with range checks, turning every violation into a [`DefinitionError`].
//!
//! Definition errors are a construction-time concern only: once a
//! [`StateMachine`](crate::machine::StateMachine) is built, execution can no
//! longer encounter them.

use miette::Diagnostic;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while validating a state-machine definition.
#[derive(Debug, Error, Diagnostic)]
pub enum DefinitionError {
    /// The definition root is not a JSON object.
    #[error("definition root must be an object")]
    #[diagnostic(code(stateweave::definition::invalid_root))]
    InvalidRoot,

    /// The definition carries no `StartAt` field.
    #[error("definition is missing `StartAt`")]
    #[diagnostic(
        code(stateweave::definition::missing_start_at),
        help("Every definition needs `StartAt` naming the first state to run.")
    )]
    MissingStartAt,

    /// `StartAt` names a state that does not exist.
    #[error("`StartAt` names unknown state `{start_at}`")]
    #[diagnostic(code(stateweave::definition::unresolved_start))]
    UnresolvedStart { start_at: String },

    /// `States` is absent, not a mapping, or empty.
    #[error("`States` must be a non-empty mapping of state names to states")]
    #[diagnostic(code(stateweave::definition::empty_states))]
    EmptyStates,

    /// A state is missing a required field.
    #[error("state `{state}` is missing required field `{field}`")]
    #[diagnostic(code(stateweave::definition::missing_field))]
    MissingField { state: String, field: &'static str },

    /// A state field is present but malformed.
    #[error("invalid `{field}` in state `{state}`: {reason}")]
    #[diagnostic(code(stateweave::definition::invalid_field))]
    InvalidField {
        state: String,
        field: &'static str,
        reason: String,
    },

    /// A state declares an unsupported `Type`.
    #[error("state `{state}` has unsupported type `{kind}`")]
    #[diagnostic(
        code(stateweave::definition::unknown_state_type),
        help("Supported types: Task, Choice, Wait, Parallel, Pass, Succeed, Fail.")
    )]
    UnknownStateType { state: String, kind: String },

    /// A state must carry exactly one of `Next` / `End: true`.
    #[error("state `{state}` must declare exactly one of `Next` or `End: true`")]
    #[diagnostic(code(stateweave::definition::ambiguous_transition))]
    AmbiguousTransition { state: String },

    /// A transition targets a state name that does not resolve.
    #[error("`{field}` in state `{state}` targets unknown state `{target}`")]
    #[diagnostic(code(stateweave::definition::unresolved_target))]
    UnresolvedTarget {
        state: String,
        field: &'static str,
        target: String,
    },

    /// A nested branch definition inside a Parallel state failed validation.
    #[error("branch {index} of parallel state `{state}` is invalid")]
    #[diagnostic(code(stateweave::definition::invalid_branch))]
    InvalidBranch {
        state: String,
        index: usize,
        #[source]
        source: Box<DefinitionError>,
    },

    /// The definition document is not valid JSON.
    #[error("definition is not valid JSON: {0}")]
    #[diagnostic(code(stateweave::definition::json))]
    Json(#[from] serde_json::Error),

    /// The definition document is not valid YAML.
    #[error("definition is not valid YAML: {0}")]
    #[diagnostic(code(stateweave::definition::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

pub(crate) fn invalid_field(
    state: &str,
    field: &'static str,
    reason: impl Into<String>,
) -> DefinitionError {
    DefinitionError::InvalidField {
        state: state.to_string(),
        field,
        reason: reason.into(),
    }
}

/// A required, non-empty string field.
pub(crate) fn req_str(
    state: &str,
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<String, DefinitionError> {
    match map.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        Some(Value::String(_)) => Err(invalid_field(state, field, "must not be empty")),
        Some(other) => Err(invalid_field(
            state,
            field,
            format!("expected a string, found {other}"),
        )),
        None => Err(DefinitionError::MissingField {
            state: state.to_string(),
            field,
        }),
    }
}

/// An optional string field; an explicit JSON `null` reads as absent.
pub(crate) fn opt_str(
    state: &str,
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, DefinitionError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(invalid_field(
            state,
            field,
            format!("expected a string, found {other}"),
        )),
    }
}

/// An optional non-negative integer field.
pub(crate) fn opt_u64(
    state: &str,
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u64>, DefinitionError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            invalid_field(state, field, "must be a non-negative integer")
        }),
        Some(other) => Err(invalid_field(
            state,
            field,
            format!("expected an integer, found {other}"),
        )),
    }
}

/// An optional strictly positive integer field.
pub(crate) fn opt_positive_u64(
    state: &str,
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u64>, DefinitionError> {
    match opt_u64(state, map, field)? {
        Some(0) => Err(invalid_field(state, field, "must be greater than zero")),
        other => Ok(other),
    }
}

/// An optional float field with a lower bound.
pub(crate) fn opt_f64_at_least(
    state: &str,
    map: &Map<String, Value>,
    field: &'static str,
    min: f64,
) -> Result<Option<f64>, DefinitionError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let value = n.as_f64().ok_or_else(|| {
                invalid_field(state, field, "must be a finite number")
            })?;
            if value < min {
                return Err(invalid_field(state, field, format!("must be at least {min}")));
            }
            Ok(Some(value))
        }
        Some(other) => Err(invalid_field(
            state,
            field,
            format!("expected a number, found {other}"),
        )),
    }
}

/// Interpret a definition node as a state map, or fail.
pub(crate) fn as_object<'a>(
    state: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, DefinitionError> {
    value.as_object().ok_or_else(|| {
        invalid_field(state, "Type", "state definition must be an object")
    })
}
