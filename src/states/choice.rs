//! Choice states: data-dependent branching over a predicate tree.
//!
//! A Choice never modifies the data value. Its rules are evaluated in
//! declared order; the first match selects the transition, `Default` backs
//! the rules up, and a Choice with no match and no default fails the
//! execution with `NoChoiceMatched`.
//!
//! Comparators never raise: a numeric comparison against something that does
//! not parse as a number is simply false.

use serde_json::{Map, Value};

use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::paths::get_at;

/// A `Type: Choice` state.
#[derive(Debug, Clone)]
pub struct ChoiceState {
    pub name: String,
    pub choices: Vec<ChoiceRule>,
    pub default: Option<String>,
}

/// One top-level choice: a predicate and the transition it selects.
#[derive(Debug, Clone)]
pub struct ChoiceRule {
    pub predicate: ChoicePredicate,
    pub next: String,
}

/// A recursive predicate: a comparison leaf or an And/Or/Not connective.
#[derive(Debug, Clone)]
pub enum ChoicePredicate {
    And(Vec<ChoicePredicate>),
    Or(Vec<ChoicePredicate>),
    Not(Box<ChoicePredicate>),
    Test {
        variable: String,
        comparison: Comparison,
    },
}

/// The comparison applied to the value a leaf's `Variable` resolves to.
///
/// `IsTimestamp` shares the string test, `IsFloat` and `IsInteger` the
/// numeric test; the dialect reserves the names without giving them
/// distinct semantics.
#[derive(Debug, Clone)]
pub enum Comparison {
    NumericEquals(Value),
    NumericLessThan(Value),
    NumericGreaterThan(Value),
    NumericLessThanEquals(Value),
    NumericGreaterThanEquals(Value),
    StringEquals(Value),
    BooleanEquals(Value),
    IsNull(bool),
    IsPresent(bool),
    IsString(bool),
    IsNumeric(bool),
    IsBoolean(bool),
    IsTimestamp(bool),
    IsFloat(bool),
    IsInteger(bool),
}

impl ChoiceState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        let raw = map.get("Choices").ok_or(DefinitionError::MissingField {
            state: name.to_string(),
            field: "Choices",
        })?;
        let entries = raw.as_array().ok_or_else(|| {
            definition::invalid_field(name, "Choices", "expected a list of choice rules")
        })?;
        if entries.is_empty() {
            return Err(definition::invalid_field(name, "Choices", "must not be empty"));
        }
        let choices = entries
            .iter()
            .map(|entry| {
                let entry = definition::as_object(name, entry)?;
                Ok(ChoiceRule {
                    predicate: ChoicePredicate::from_def(name, entry)?,
                    next: definition::req_str(name, entry, "Next")?,
                })
            })
            .collect::<Result<Vec<_>, DefinitionError>>()?;
        Ok(Self {
            name: name.to_string(),
            choices,
            default: definition::opt_str(name, map, "Default")?,
        })
    }

    /// Choice execution is pure: the data value passes through unchanged.
    pub(crate) fn execute(&self, input: &Value) -> Result<Value, ExecutionError> {
        Ok(input.clone())
    }

    /// Select the transition for the given data value.
    pub(crate) fn next_state(&self, data: &Value) -> Result<&str, ExecutionError> {
        for rule in &self.choices {
            if rule.predicate.evaluate(data) {
                return Ok(&rule.next);
            }
        }
        self.default
            .as_deref()
            .ok_or_else(|| ExecutionError::NoChoiceMatched {
                state: self.name.clone(),
            })
    }
}

impl ChoicePredicate {
    pub(crate) fn from_def(
        state: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        if let Some(raw) = map.get("And") {
            return Ok(ChoicePredicate::And(Self::list_from_def(state, "And", raw)?));
        }
        if let Some(raw) = map.get("Or") {
            return Ok(ChoicePredicate::Or(Self::list_from_def(state, "Or", raw)?));
        }
        if let Some(raw) = map.get("Not") {
            let inner = definition::as_object(state, raw)?;
            return Ok(ChoicePredicate::Not(Box::new(Self::from_def(state, inner)?)));
        }
        Ok(ChoicePredicate::Test {
            variable: definition::req_str(state, map, "Variable")?,
            comparison: Comparison::from_def(state, map)?,
        })
    }

    fn list_from_def(
        state: &str,
        field: &'static str,
        raw: &Value,
    ) -> Result<Vec<Self>, DefinitionError> {
        let entries = raw.as_array().ok_or_else(|| {
            definition::invalid_field(state, field, "expected a list of predicates")
        })?;
        if entries.is_empty() {
            return Err(definition::invalid_field(state, field, "must not be empty"));
        }
        entries
            .iter()
            .map(|entry| Self::from_def(state, definition::as_object(state, entry)?))
            .collect()
    }

    /// Evaluate this predicate against a data value. Connectives
    /// short-circuit; leaves resolve their `Variable` path first.
    #[must_use]
    pub fn evaluate(&self, data: &Value) -> bool {
        match self {
            ChoicePredicate::And(predicates) => {
                predicates.iter().all(|p| p.evaluate(data))
            }
            ChoicePredicate::Or(predicates) => predicates.iter().any(|p| p.evaluate(data)),
            ChoicePredicate::Not(inner) => !inner.evaluate(data),
            ChoicePredicate::Test {
                variable,
                comparison,
            } => comparison.evaluate(&get_at(data, variable)),
        }
    }
}

impl Comparison {
    fn from_def(state: &str, map: &Map<String, Value>) -> Result<Self, DefinitionError> {
        use Comparison::*;
        for (key, operand) in map {
            let comparison = match key.as_str() {
                "NumericEquals" => NumericEquals(operand.clone()),
                "NumericLessThan" => NumericLessThan(operand.clone()),
                "NumericGreaterThan" => NumericGreaterThan(operand.clone()),
                "NumericLessThanEquals" => NumericLessThanEquals(operand.clone()),
                "NumericGreaterThanEquals" => NumericGreaterThanEquals(operand.clone()),
                "StringEquals" => StringEquals(operand.clone()),
                "BooleanEquals" => BooleanEquals(operand.clone()),
                "IsNull" => IsNull(bool_operand(state, "IsNull", operand)?),
                "IsPresent" => IsPresent(bool_operand(state, "IsPresent", operand)?),
                "IsString" => IsString(bool_operand(state, "IsString", operand)?),
                "IsNumeric" => IsNumeric(bool_operand(state, "IsNumeric", operand)?),
                "IsBoolean" => IsBoolean(bool_operand(state, "IsBoolean", operand)?),
                "IsTimestamp" => IsTimestamp(bool_operand(state, "IsTimestamp", operand)?),
                "IsFloat" => IsFloat(bool_operand(state, "IsFloat", operand)?),
                "IsInteger" => IsInteger(bool_operand(state, "IsInteger", operand)?),
                _ => continue,
            };
            return Ok(comparison);
        }
        Err(definition::invalid_field(
            state,
            "Choices",
            "choice rule carries no recognized comparator",
        ))
    }

    /// Apply the comparison to the resolved variable value.
    #[must_use]
    pub fn evaluate(&self, actual: &Value) -> bool {
        match self {
            Comparison::NumericEquals(operand) => numeric(actual, operand, |a, b| a == b),
            Comparison::NumericLessThan(operand) => numeric(actual, operand, |a, b| a < b),
            Comparison::NumericGreaterThan(operand) => numeric(actual, operand, |a, b| a > b),
            Comparison::NumericLessThanEquals(operand) => {
                numeric(actual, operand, |a, b| a <= b)
            }
            Comparison::NumericGreaterThanEquals(operand) => {
                numeric(actual, operand, |a, b| a >= b)
            }
            Comparison::StringEquals(operand) => match (actual, operand) {
                (Value::String(a), Value::String(b)) => a == b,
                _ => false,
            },
            Comparison::BooleanEquals(operand) => {
                match (as_boolean(actual), as_boolean(operand)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            Comparison::IsNull(expected) => actual.is_null() == *expected,
            Comparison::IsPresent(expected) => !actual.is_null() == *expected,
            Comparison::IsString(expected) | Comparison::IsTimestamp(expected) => {
                actual.is_string() == *expected
            }
            Comparison::IsNumeric(expected)
            | Comparison::IsFloat(expected)
            | Comparison::IsInteger(expected) => as_number(actual).is_some() == *expected,
            Comparison::IsBoolean(expected) => as_boolean(actual).is_some() == *expected,
        }
    }
}

fn numeric(actual: &Value, operand: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), as_number(operand)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Numbers, and strings that parse as a finite number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Booleans, and the strings `"true"` / `"false"` (case-insensitive).
fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn bool_operand(
    state: &str,
    field: &'static str,
    operand: &Value,
) -> Result<bool, DefinitionError> {
    operand.as_bool().ok_or_else(|| {
        definition::invalid_field(state, field, "operand must be a boolean literal")
    })
}
