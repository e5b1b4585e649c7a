//! The seven state variants and their shared contract.
//!
//! States are modeled as a tagged sum, [`State`], rather than trait objects:
//! the set of variants is closed by the language, and the driver needs to ask
//! structural questions (terminality, failure codes, transition targets) that
//! are natural as `match` arms. Every variant shares the same small
//! capability set:
//!
//! - **validate at construction** — each variant's `from_def` rejects a
//!   malformed definition with a
//!   [`DefinitionError`](crate::definition::DefinitionError); a built state
//!   can no longer fail structurally.
//! - **execute** — consume the current data value, produce the next one.
//! - **next_state** — name the follow-on state (data-dependent for Choice).
//! - **is_terminal** — whether the execution ends here.
//!
//! States reference each other by name only; resolution always goes through
//! the machine's `States` map, so the state graph may be cyclic without any
//! reference cycles in memory.

pub mod choice;
pub mod fail;
pub mod parallel;
pub mod pass;
pub mod succeed;
pub mod task;
pub mod wait;

pub use choice::{ChoicePredicate, ChoiceRule, ChoiceState, Comparison};
pub use fail::FailState;
pub use parallel::ParallelState;
pub use pass::PassState;
pub use succeed::SucceedState;
pub use task::TaskState;
pub use wait::{WaitSpec, WaitState};

use serde_json::{Map, Value};

use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::runtime::ExecutionContext;

/// Where control flows after a non-terminal state: a named successor, or the
/// end of the machine.
///
/// Task, Pass, Wait, and Parallel states must declare exactly one of
/// `Next` / `End: true`; the constructor enforces the exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(String),
    End,
}

impl Transition {
    pub(crate) fn from_def(
        state: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        let next = map.get("Next");
        let end = map.get("End").and_then(Value::as_bool).unwrap_or(false);
        match (next, end) {
            (Some(Value::String(target)), false) => Ok(Transition::Next(target.clone())),
            (None, true) => Ok(Transition::End),
            _ => Err(DefinitionError::AmbiguousTransition {
                state: state.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn next_name(&self) -> Option<&str> {
        match self {
            Transition::Next(target) => Some(target),
            Transition::End => None,
        }
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Transition::End)
    }
}

/// A single state of a machine, tagged by its `Type` field.
#[derive(Debug, Clone)]
pub enum State {
    Task(TaskState),
    Choice(ChoiceState),
    Wait(WaitState),
    Parallel(ParallelState),
    Pass(PassState),
    Succeed(SucceedState),
    Fail(FailState),
}

impl State {
    /// Build and validate one state from its definition node.
    pub(crate) fn from_def(name: &str, def: &Value) -> Result<Self, DefinitionError> {
        let map = definition::as_object(name, def)?;
        let kind = definition::req_str(name, map, "Type")?;
        match kind.as_str() {
            "Task" => TaskState::from_def(name, map).map(State::Task),
            "Choice" => ChoiceState::from_def(name, map).map(State::Choice),
            "Wait" => WaitState::from_def(name, map).map(State::Wait),
            "Parallel" => ParallelState::from_def(name, map).map(State::Parallel),
            "Pass" => PassState::from_def(name, map).map(State::Pass),
            "Succeed" => SucceedState::from_def(name, map).map(State::Succeed),
            "Fail" => FailState::from_def(name, map).map(State::Fail),
            _ => Err(DefinitionError::UnknownStateType {
                state: name.to_string(),
                kind,
            }),
        }
    }

    /// The state's own name within the machine.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            State::Task(s) => &s.name,
            State::Choice(s) => &s.name,
            State::Wait(s) => &s.name,
            State::Parallel(s) => &s.name,
            State::Pass(s) => &s.name,
            State::Succeed(s) => &s.name,
            State::Fail(s) => &s.name,
        }
    }

    /// The `Type` tag this state was built from.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            State::Task(_) => "Task",
            State::Choice(_) => "Choice",
            State::Wait(_) => "Wait",
            State::Parallel(_) => "Parallel",
            State::Pass(_) => "Pass",
            State::Succeed(_) => "Succeed",
            State::Fail(_) => "Fail",
        }
    }

    /// Execute this state against the current data value.
    pub async fn execute(
        &self,
        input: &Value,
        ctx: &mut ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        match self {
            State::Task(s) => s.execute(input, ctx).await,
            State::Choice(s) => s.execute(input),
            State::Wait(s) => s.execute(input).await,
            State::Parallel(s) => s.execute(input, ctx).await,
            State::Pass(s) => s.execute(input),
            State::Succeed(s) => s.execute(input),
            State::Fail(s) => s.execute(input),
        }
    }

    /// The declared successor for the given output value.
    ///
    /// `Ok(None)` means the state ends the machine; Choice states evaluate
    /// their rules here and report `NoChoiceMatched` when nothing applies.
    pub fn next_state(&self, output: &Value) -> Result<Option<String>, ExecutionError> {
        match self {
            State::Task(s) => Ok(s.transition.next_name().map(str::to_string)),
            State::Wait(s) => Ok(s.transition.next_name().map(str::to_string)),
            State::Parallel(s) => Ok(s.transition.next_name().map(str::to_string)),
            State::Pass(s) => Ok(s.transition.next_name().map(str::to_string)),
            State::Choice(s) => s.next_state(output).map(|target| Some(target.to_string())),
            State::Succeed(_) | State::Fail(_) => Ok(None),
        }
    }

    /// Whether the execution terminates in this state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            State::Succeed(_) | State::Fail(_) => true,
            State::Task(s) => s.transition.is_end(),
            State::Wait(s) => s.transition.is_end(),
            State::Parallel(s) => s.transition.is_end(),
            State::Pass(s) => s.transition.is_end(),
            State::Choice(_) => false,
        }
    }

    /// Failure codes for a deliberate Fail state.
    #[must_use]
    pub fn failure(&self) -> Option<(&str, &str)> {
        match self {
            State::Fail(s) => Some((&s.error, &s.cause)),
            _ => None,
        }
    }

    /// All `(field, target)` state names this state can transition to,
    /// for builder-time resolution checks.
    pub(crate) fn transition_targets(&self) -> Vec<(&'static str, &str)> {
        let mut targets = Vec::new();
        let (transition, catches) = match self {
            State::Task(s) => (Some(&s.transition), Some(&s.catch)),
            State::Parallel(s) => (Some(&s.transition), Some(&s.catch)),
            State::Wait(s) => (Some(&s.transition), None),
            State::Pass(s) => (Some(&s.transition), None),
            State::Choice(s) => {
                for rule in &s.choices {
                    targets.push(("Next", rule.next.as_str()));
                }
                if let Some(default) = &s.default {
                    targets.push(("Default", default.as_str()));
                }
                (None, None)
            }
            State::Succeed(_) | State::Fail(_) => (None, None),
        };
        if let Some(transition) = transition {
            if let Some(next) = transition.next_name() {
                targets.push(("Next", next));
            }
        }
        if let Some(catches) = catches {
            for policy in catches.iter() {
                targets.push(("Catch.Next", policy.next.as_str()));
            }
        }
        targets
    }
}
