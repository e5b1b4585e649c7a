//! The mutable execution record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ExecutionError;
use crate::runtime::ExecutionContext;

/// Where an execution stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only execution history: the data a state saw and
/// what it produced, in visitation order.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub state_name: String,
    pub input: Value,
    pub output: Value,
    pub timestamp: DateTime<Utc>,
}

/// A single run of a state machine.
///
/// Created by
/// [`StateMachine::start_execution`](crate::machine::StateMachine::start_execution)
/// and advanced by the driver. The original input is captured once and never
/// mutated; `output` holds the value flowing into the next state.
#[derive(Debug)]
pub struct Execution {
    pub name: String,
    pub input: Value,
    pub output: Value,
    pub status: ExecutionStatus,
    pub current_state: Option<String>,
    pub error: Option<String>,
    pub cause: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub context: ExecutionContext,
}

impl Execution {
    pub(crate) fn new(
        name: String,
        input: Value,
        start_at: &str,
        context: ExecutionContext,
    ) -> Self {
        Self {
            name,
            output: input.clone(),
            input,
            status: ExecutionStatus::Running,
            current_state: Some(start_at.to_string()),
            error: None,
            cause: None,
            history: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
            context,
        }
    }

    /// Record one visited state: update the output and append history.
    pub(crate) fn record_step(&mut self, state_name: &str, input: &Value, output: Value) {
        self.history.push(HistoryEntry {
            state_name: state_name.to_string(),
            input: input.clone(),
            output: output.clone(),
            timestamp: Utc::now(),
        });
        self.output = output;
    }

    pub(crate) fn finish_succeeded(&mut self) {
        self.status = ExecutionStatus::Succeeded;
        self.end_time = Some(Utc::now());
    }

    pub(crate) fn finish_failed(&mut self, error: &str, cause: &str) {
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.to_string());
        self.cause = Some(cause.to_string());
        self.end_time = Some(Utc::now());
    }

    pub(crate) fn fail_with(&mut self, err: &ExecutionError) {
        self.finish_failed(err.error_name(), &err.cause_text());
    }

    /// Elapsed wall time in seconds, up to now for a running execution.
    #[must_use]
    pub fn execution_time(&self) -> f64 {
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Serialize the execution to its snapshot mapping.
    ///
    /// The snapshot is a plain JSON object with the keys `name`, `status`,
    /// `current_state`, `input`, `output`, `error`, `cause`, `start_time`,
    /// `end_time`, `execution_time` (seconds, floating), and `history` (a
    /// list of `{state_name, input, output, timestamp}` entries in
    /// visitation order). Timestamps are RFC 3339 strings.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use stateweave::machine::StateMachine;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let machine = StateMachine::from_value(&json!({
    ///     "StartAt": "Done",
    ///     "States": {"Done": {"Type": "Succeed"}}
    /// })).unwrap();
    ///
    /// let mut execution = machine.start_execution(json!({"k": 1}));
    /// machine.run_all(&mut execution).await;
    ///
    /// let snapshot = execution.snapshot();
    /// assert_eq!(snapshot["status"], json!("Succeeded"));
    /// assert_eq!(snapshot["input"], json!({"k": 1}));
    /// assert_eq!(snapshot["history"][0]["state_name"], json!("Done"));
    /// # }
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> Value {
        json!({
            "name": self.name,
            "status": self.status.as_str(),
            "current_state": self.current_state,
            "input": self.input,
            "output": self.output,
            "error": self.error,
            "cause": self.cause,
            "start_time": self.start_time.to_rfc3339(),
            "end_time": self.end_time.map(|t| t.to_rfc3339()),
            "execution_time": self.execution_time(),
            "history": self.history,
        })
    }
}
