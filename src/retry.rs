//! Retry and catch policies for error-routing states.
//!
//! Task and Parallel states own ordered `Retry` and `Catch` lists. On
//! failure, retry entries are consulted first (in declared order); the first
//! entry whose `ErrorEquals` matches the raised error and whose attempt
//! budget is not exhausted wins, the state sleeps the computed backoff, and
//! the invocation re-executes. Once retry is exhausted or inapplicable,
//! catch entries route the error to a recovery state by placing an
//! `{Error, Cause}` object into the input and announcing the target through
//! the execution context's next-state override slot.
//!
//! Error-name matching:
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `States.ALL` | every error |
//! | `States.Timeout` | the task-timeout sentinel only |
//! | `States.TaskFailed` | any non-timeout error |
//! | `States.Permissions` | permission-class errors (name or message) |
//! | anything else | error-name equality, or the literal as a substring of the cause |

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::dataflow::{apply_result_path, ResultDisposition};
use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::runtime::ExecutionContext;

const DEFAULT_INTERVAL_SECONDS: u64 = 1;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_RATE: f64 = 2.0;
const DEFAULT_MAX_DELAY_SECONDS: u64 = 3600;

/// One entry of a state's `Retry` list.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub error_equals: Vec<String>,
    pub interval_seconds: u64,
    pub max_attempts: u32,
    pub backoff_rate: f64,
    pub max_delay: u64,
}

impl RetryPolicy {
    /// Parse the optional `Retry` field of a state definition.
    pub(crate) fn list_from_def(
        state: &str,
        map: &Map<String, Value>,
    ) -> Result<Vec<Self>, DefinitionError> {
        let Some(raw) = map.get("Retry") else {
            return Ok(Vec::new());
        };
        let entries = raw.as_array().ok_or_else(|| {
            definition::invalid_field(state, "Retry", "expected a list of retry policies")
        })?;
        entries
            .iter()
            .map(|entry| {
                let entry = definition::as_object(state, entry)?;
                Ok(Self {
                    error_equals: error_equals(state, entry)?,
                    interval_seconds: definition::opt_u64(state, entry, "IntervalSeconds")?
                        .unwrap_or(DEFAULT_INTERVAL_SECONDS),
                    max_attempts: definition::opt_u64(state, entry, "MaxAttempts")?
                        .map(|n| n as u32)
                        .unwrap_or(DEFAULT_MAX_ATTEMPTS),
                    backoff_rate: definition::opt_f64_at_least(state, entry, "BackoffRate", 1.0)?
                        .unwrap_or(DEFAULT_BACKOFF_RATE),
                    max_delay: definition::opt_u64(state, entry, "MaxDelay")?
                        .unwrap_or(DEFAULT_MAX_DELAY_SECONDS),
                })
            })
            .collect()
    }

    /// Whether this entry matches the raised error.
    #[must_use]
    pub fn matches(&self, err: &ExecutionError) -> bool {
        self.error_equals.iter().any(|p| error_matches(p, err))
    }

    /// Backoff before the retry that follows `attempt` (1-indexed):
    /// `min(interval × rate^(attempt − 1), max_delay)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use stateweave::retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy {
    ///     error_equals: vec!["States.ALL".to_string()],
    ///     interval_seconds: 1,
    ///     max_attempts: 5,
    ///     backoff_rate: 2.0,
    ///     max_delay: 6,
    /// };
    /// assert_eq!(policy.backoff(1), Duration::from_secs(1));
    /// assert_eq!(policy.backoff(2), Duration::from_secs(2));
    /// assert_eq!(policy.backoff(3), Duration::from_secs(4));
    /// // 2^3 = 8 caps at max_delay
    /// assert_eq!(policy.backoff(4), Duration::from_secs(6));
    /// ```
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let raw = self.interval_seconds as f64 * self.backoff_rate.powi(exponent);
        Duration::from_secs_f64(raw.min(self.max_delay as f64))
    }
}

/// One entry of a state's `Catch` list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchPolicy {
    pub error_equals: Vec<String>,
    pub next: String,
    /// Overrides the state's own `ResultPath` when present.
    pub result_path: Option<ResultDisposition>,
}

impl CatchPolicy {
    /// Parse the optional `Catch` field of a state definition.
    pub(crate) fn list_from_def(
        state: &str,
        map: &Map<String, Value>,
    ) -> Result<Vec<Self>, DefinitionError> {
        let Some(raw) = map.get("Catch") else {
            return Ok(Vec::new());
        };
        let entries = raw.as_array().ok_or_else(|| {
            definition::invalid_field(state, "Catch", "expected a list of catch policies")
        })?;
        entries
            .iter()
            .map(|entry| {
                let entry = definition::as_object(state, entry)?;
                let result_path = if entry.contains_key("ResultPath") {
                    Some(ResultDisposition::from_def(state, entry, "ResultPath")?)
                } else {
                    None
                };
                Ok(Self {
                    error_equals: error_equals(state, entry)?,
                    next: definition::req_str(state, entry, "Next")?,
                    result_path,
                })
            })
            .collect()
    }
}

fn error_equals(
    state: &str,
    entry: &Map<String, Value>,
) -> Result<Vec<String>, DefinitionError> {
    let raw = entry.get("ErrorEquals").ok_or(DefinitionError::MissingField {
        state: state.to_string(),
        field: "ErrorEquals",
    })?;
    let names = raw.as_array().ok_or_else(|| {
        definition::invalid_field(state, "ErrorEquals", "expected a list of error names")
    })?;
    if names.is_empty() {
        return Err(definition::invalid_field(state, "ErrorEquals", "must not be empty"));
    }
    names
        .iter()
        .map(|name| {
            name.as_str().map(str::to_string).ok_or_else(|| {
                definition::invalid_field(state, "ErrorEquals", "entries must be strings")
            })
        })
        .collect()
}

/// Match a single `ErrorEquals` pattern against a raised error.
///
/// # Examples
///
/// ```rust
/// use stateweave::errors::ExecutionError;
/// use stateweave::retry::error_matches;
///
/// let err = ExecutionError::TaskFailed {
///     error: "RuntimeError".to_string(),
///     cause: "connection reset".to_string(),
/// };
/// assert!(error_matches("States.ALL", &err));
/// assert!(error_matches("RuntimeError", &err));
/// assert!(error_matches("connection", &err));
/// assert!(!error_matches("States.Timeout", &err));
/// ```
#[must_use]
pub fn error_matches(pattern: &str, err: &ExecutionError) -> bool {
    match pattern {
        "States.ALL" => true,
        "States.Timeout" => err.is_timeout(),
        "States.TaskFailed" => !err.is_timeout(),
        "States.Permissions" => {
            err.error_name() == "States.Permissions"
                || err.cause_text().to_lowercase().contains("permission")
        }
        literal => err.error_name() == literal || err.cause_text().contains(literal),
    }
}

/// Decide whether a retry happens after `attempts_made` invocations have
/// failed, and if so, for how long to back off first.
///
/// Entries are consulted in declared order; the first one that matches the
/// error and still has attempt budget wins.
#[must_use]
pub fn retry_delay(
    policies: &[RetryPolicy],
    err: &ExecutionError,
    attempts_made: u32,
) -> Option<Duration> {
    policies
        .iter()
        .find(|p| p.matches(err) && attempts_made < p.max_attempts)
        .map(|p| p.backoff(attempts_made))
}

/// Route an error through the `Catch` list.
///
/// On a match, builds the `{Error, Cause}` object, places it into `input`
/// via the catch's `ResultPath` (falling back to the state's own), announces
/// the redirect through the context override slot, and returns the placed
/// value for the state to emit as its output.
pub fn apply_catch(
    policies: &[CatchPolicy],
    state_result_path: &ResultDisposition,
    input: &Value,
    err: &ExecutionError,
    ctx: &mut ExecutionContext,
) -> Option<Value> {
    let policy = policies
        .iter()
        .find(|c| c.error_equals.iter().any(|p| error_matches(p, err)))?;
    let info = json!({
        "Error": err.error_name(),
        "Cause": err.cause_text(),
    });
    let disposition = policy.result_path.as_ref().unwrap_or(state_result_path);
    let placed = apply_result_path(input, info, disposition);
    debug!(next = %policy.next, error = %err.error_name(), "catch matched, redirecting");
    ctx.set_next_override(&policy.next);
    Some(placed)
}
