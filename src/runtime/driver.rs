//! The driver loop: advancing an execution one state at a time.

use chrono::Utc;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::errors::ExecutionError;
use crate::machine::StateMachine;
use crate::runtime::{Execution, ExecutionContext, ExecutionStatus};

/// Time-plus-random-hex identifier for unnamed executions.
fn generate_name() -> String {
    format!(
        "exec-{}-{:08x}",
        Utc::now().format("%Y%m%d%H%M%S"),
        rand::random::<u32>()
    )
}

impl StateMachine {
    /// Begin a new execution with a default context (no executor registered,
    /// so Task states synthesize simulated results).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use stateweave::machine::StateMachine;
    /// use stateweave::runtime::ExecutionStatus;
    ///
    /// let machine = StateMachine::from_value(&json!({
    ///     "StartAt": "Done",
    ///     "States": {"Done": {"Type": "Succeed"}}
    /// })).unwrap();
    ///
    /// let execution = machine.start_execution(json!({"k": 1}));
    /// assert_eq!(execution.status, ExecutionStatus::Running);
    /// assert_eq!(execution.current_state.as_deref(), Some("Done"));
    /// assert_eq!(execution.input, json!({"k": 1}));
    /// ```
    #[must_use]
    pub fn start_execution(&self, input: Value) -> Execution {
        self.start_execution_with(input, None, ExecutionContext::default())
    }

    /// Begin a new execution with an explicit name and context.
    ///
    /// The input is captured once; the caller's value is never mutated by
    /// the engine.
    #[must_use]
    pub fn start_execution_with(
        &self,
        input: Value,
        name: Option<String>,
        context: ExecutionContext,
    ) -> Execution {
        let name = name.unwrap_or_else(generate_name);
        debug!(execution = %name, start_at = %self.start_at, "starting execution");
        Execution::new(name, input, &self.start_at, context)
    }

    /// Advance the execution by exactly one state.
    ///
    /// Failures are recorded on the execution record (status, error, cause,
    /// end time) *and* returned, so callers can either inspect the record or
    /// propagate with `?`. Calling this on a finished execution is a no-op.
    #[instrument(skip(self, execution), fields(execution = %execution.name), err)]
    pub async fn run_next(&self, execution: &mut Execution) -> Result<(), ExecutionError> {
        if !execution.status.is_running() {
            return Ok(());
        }
        let Some(current) = execution.current_state.clone() else {
            return Ok(());
        };

        let Some(state) = self.states.get(&current) else {
            let err = ExecutionError::StateNotFound { state: current };
            execution.fail_with(&err);
            return Err(err);
        };

        debug!(state = %current, kind = state.kind(), "entering state");
        execution.context.enter_state(&current);
        let step_input = execution.output.clone();

        let output = match state.execute(&step_input, &mut execution.context).await {
            Ok(output) => output,
            Err(err) => {
                error!(state = %current, error = %err, "state failed");
                execution.record_step(&current, &step_input, step_input.clone());
                execution.fail_with(&err);
                return Err(err);
            }
        };
        execution.record_step(&current, &step_input, output);

        if state.is_terminal() {
            match state.failure() {
                Some((error, cause)) => execution.finish_failed(error, cause),
                None => execution.finish_succeeded(),
            }
            debug!(state = %current, status = %execution.status, "execution finished");
            return Ok(());
        }

        if let Some(target) = execution.context.take_next_override() {
            debug!(from = %current, to = %target, "catch redirect");
            execution.current_state = Some(target);
            return Ok(());
        }

        match state.next_state(&execution.output) {
            Ok(Some(target)) => {
                debug!(from = %current, to = %target, "transition");
                execution.current_state = Some(target);
                Ok(())
            }
            Ok(None) => {
                let err = ExecutionError::NoNextState { state: current };
                execution.fail_with(&err);
                Err(err)
            }
            Err(err) => {
                execution.fail_with(&err);
                Err(err)
            }
        }
    }

    /// Drive the execution until it leaves `Running`, returning the final
    /// status. Step failures are already recorded on the execution record,
    /// so this never returns an error.
    ///
    /// Boxed so Parallel states can recurse through nested machines.
    ///
    /// A machine-level `TimeoutSeconds` is advisory; a host that wants to
    /// enforce it wraps this future in `tokio::time::timeout` and treats the
    /// elapsed case as its own failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use stateweave::machine::StateMachine;
    /// use stateweave::runtime::ExecutionStatus;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let machine = StateMachine::from_value(&json!({
    ///     "StartAt": "Shape",
    ///     "States": {
    ///         "Shape": {"Type": "Pass", "Result": {"done": true}, "End": true}
    ///     }
    /// })).unwrap();
    ///
    /// let mut execution = machine.start_execution(json!({}));
    /// let status = machine.run_all(&mut execution).await;
    /// assert_eq!(status, ExecutionStatus::Succeeded);
    /// assert_eq!(execution.output, json!({"done": true}));
    /// # }
    /// ```
    pub fn run_all<'a>(
        &'a self,
        execution: &'a mut Execution,
    ) -> BoxFuture<'a, ExecutionStatus> {
        Box::pin(async move {
            while execution.status.is_running() {
                if self.run_next(execution).await.is_err() {
                    break;
                }
            }
            execution.status
        })
    }
}
