//! Wait states: suspend an execution for a duration or until an instant.
//!
//! Exactly one of `Seconds`, `Timestamp`, `SecondsPath`, `TimestampPath`
//! must be present; the constructor enforces this. Literal fields are
//! validated at build time, path fields at runtime (an unresolvable or
//! malformed value is an `InvalidWaitConfig` failure). Suspension goes
//! through `tokio::time::sleep`, so a waiting execution never blocks other
//! work on the runtime.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::paths::get_at;
use crate::states::Transition;

/// A `Type: Wait` state.
#[derive(Debug, Clone)]
pub struct WaitState {
    pub name: String,
    pub spec: WaitSpec,
    pub transition: Transition,
}

/// How the wait duration is determined.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitSpec {
    /// Literal number of seconds.
    Seconds(u64),
    /// Literal target instant; the wait is `max(0, target − now)`.
    Timestamp(DateTime<Utc>),
    /// Path resolving to the number of seconds at runtime.
    SecondsPath(String),
    /// Path resolving to an RFC 3339 instant at runtime.
    TimestampPath(String),
}

impl WaitState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        let mut specs = Vec::new();
        if let Some(raw) = map.get("Seconds") {
            specs.push(WaitSpec::Seconds(literal_seconds(name, raw)?));
        }
        if let Some(raw) = map.get("Timestamp") {
            specs.push(WaitSpec::Timestamp(literal_timestamp(name, raw)?));
        }
        if let Some(path) = definition::opt_str(name, map, "SecondsPath")? {
            specs.push(WaitSpec::SecondsPath(path));
        }
        if let Some(path) = definition::opt_str(name, map, "TimestampPath")? {
            specs.push(WaitSpec::TimestampPath(path));
        }
        let mut drain = specs.into_iter();
        match (drain.next(), drain.next()) {
            (Some(spec), None) => Ok(Self {
                name: name.to_string(),
                spec,
                transition: Transition::from_def(name, map)?,
            }),
            _ => Err(definition::invalid_field(
                name,
                "Seconds",
                "exactly one of Seconds, Timestamp, SecondsPath, TimestampPath is required",
            )),
        }
    }

    pub(crate) async fn execute(&self, input: &Value) -> Result<Value, ExecutionError> {
        let duration = self.resolve_duration(input)?;
        if !duration.is_zero() {
            debug!(state = %self.name, secs = duration.as_secs_f64(), "waiting");
            tokio::time::sleep(duration).await;
        }
        Ok(input.clone())
    }

    fn resolve_duration(&self, input: &Value) -> Result<Duration, ExecutionError> {
        match &self.spec {
            WaitSpec::Seconds(seconds) => Ok(Duration::from_secs(*seconds)),
            WaitSpec::Timestamp(target) => Ok(until(*target)),
            WaitSpec::SecondsPath(path) => {
                let value = get_at(input, path);
                runtime_seconds(&self.name, path, &value).map(Duration::from_secs)
            }
            WaitSpec::TimestampPath(path) => {
                let value = get_at(input, path);
                let text = value.as_str().ok_or_else(|| self.invalid(path, &value))?;
                let target = DateTime::parse_from_rfc3339(text)
                    .map_err(|_| self.invalid(path, &value))?;
                Ok(until(target.with_timezone(&Utc)))
            }
        }
    }

    fn invalid(&self, path: &str, value: &Value) -> ExecutionError {
        ExecutionError::InvalidWaitConfig {
            state: self.name.clone(),
            reason: format!("`{path}` resolved to unusable value {value}"),
        }
    }
}

/// Clamp a target instant to a non-negative wait from now.
fn until(target: DateTime<Utc>) -> Duration {
    (target - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}

fn runtime_seconds(state: &str, path: &str, value: &Value) -> Result<u64, ExecutionError> {
    let seconds = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    seconds.ok_or_else(|| ExecutionError::InvalidWaitConfig {
        state: state.to_string(),
        reason: format!("`{path}` resolved to unusable value {value}"),
    })
}

fn literal_seconds(state: &str, raw: &Value) -> Result<u64, DefinitionError> {
    let seconds = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    seconds.ok_or_else(|| {
        definition::invalid_field(
            state,
            "Seconds",
            "must be a non-negative integer or a string that parses as one",
        )
    })
}

fn literal_timestamp(state: &str, raw: &Value) -> Result<DateTime<Utc>, DefinitionError> {
    let text = raw.as_str().ok_or_else(|| {
        definition::invalid_field(state, "Timestamp", "must be an RFC 3339 string")
    })?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| definition::invalid_field(state, "Timestamp", err.to_string()))
}
