//! Runtime error taxonomy for state execution.
//!
//! Every failure mode an execution can hit is a variant of
//! [`ExecutionError`]. The [`error_name`](ExecutionError::error_name) /
//! [`cause_text`](ExecutionError::cause_text) pair is what lands on the
//! execution record and what the retry/catch matcher inspects: host-raised
//! task failures surface their class name verbatim, engine failures surface
//! the taxonomy name.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while advancing an execution.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ExecutionError {
    /// A transition targeted a state name that is not in the machine.
    #[error("state `{state}` not found in machine")]
    #[diagnostic(code(stateweave::execution::state_not_found))]
    StateNotFound { state: String },

    /// A non-terminal state produced no transition target.
    #[error("state `{state}` has no next state to transition to")]
    #[diagnostic(code(stateweave::execution::no_next_state))]
    NoNextState { state: String },

    /// A Choice state matched no rule and declares no `Default`.
    #[error("no choice rule matched in state `{state}` and no `Default` is set")]
    #[diagnostic(
        code(stateweave::execution::no_choice_matched),
        help("Add a `Default` transition or widen the choice rules.")
    )]
    NoChoiceMatched { state: String },

    /// A task invocation outlived its configured deadline.
    #[error("task `{state}` timed out after {seconds}s")]
    #[diagnostic(code(stateweave::execution::task_timeout))]
    TaskTimeout { state: String, seconds: u64 },

    /// The host executor reported a failure; `error` is the host-defined
    /// class name, `cause` the human-readable message.
    #[error("{error}: {cause}")]
    #[diagnostic(code(stateweave::execution::task_failed))]
    TaskFailed { error: String, cause: String },

    /// A Parallel branch failed; carries the originating error and cause.
    #[error("branch {branch} failed with {error}: {cause}")]
    #[diagnostic(code(stateweave::execution::branch_failed))]
    BranchFailed {
        branch: usize,
        error: String,
        cause: String,
    },

    /// A Wait state could not compute its duration at runtime.
    #[error("invalid wait configuration in state `{state}`: {reason}")]
    #[diagnostic(code(stateweave::execution::invalid_wait))]
    InvalidWaitConfig { state: String, reason: String },
}

impl ExecutionError {
    /// The error name surfaced on the execution record and matched by
    /// `ErrorEquals` entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stateweave::errors::ExecutionError;
    ///
    /// let host = ExecutionError::TaskFailed {
    ///     error: "RuntimeError".to_string(),
    ///     cause: "boom".to_string(),
    /// };
    /// assert_eq!(host.error_name(), "RuntimeError");
    /// assert_eq!(host.cause_text(), "boom");
    ///
    /// let timeout = ExecutionError::TaskTimeout {
    ///     state: "Fetch".to_string(),
    ///     seconds: 30,
    /// };
    /// assert_eq!(timeout.error_name(), "TaskTimeout");
    /// assert!(timeout.is_timeout());
    /// ```
    #[must_use]
    pub fn error_name(&self) -> &str {
        match self {
            Self::StateNotFound { .. } => "StateNotFound",
            Self::NoNextState { .. } => "NoNextState",
            Self::NoChoiceMatched { .. } => "NoChoiceMatched",
            Self::TaskTimeout { .. } => "TaskTimeout",
            Self::TaskFailed { error, .. } => error,
            Self::BranchFailed { .. } => "BranchFailed",
            Self::InvalidWaitConfig { .. } => "InvalidWaitConfig",
        }
    }

    /// The human-readable cause surfaced on the execution record.
    #[must_use]
    pub fn cause_text(&self) -> String {
        match self {
            Self::TaskFailed { cause, .. } => cause.clone(),
            Self::BranchFailed { cause, .. } => cause.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error is timeout-class for `States.Timeout` matching:
    /// either the engine's own deadline sentinel or a host failure named
    /// after it.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::TaskTimeout { .. } => true,
            Self::TaskFailed { error, .. } => {
                error == "TaskTimeout" || error == "States.Timeout"
            }
            _ => false,
        }
    }
}
