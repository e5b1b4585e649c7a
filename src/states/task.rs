//! Task states: invoke an opaque resource through the executor boundary.
//!
//! A Task threads its input through the full data-flow pipeline around one
//! executor invocation, optionally under a deadline and with a heartbeat
//! monitor, and consults its `Retry` and `Catch` lists on failure. See
//! [`crate::retry`] for the policy semantics and [`crate::executor`] for the
//! callout contract.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use crate::dataflow::{
    apply_input_path, apply_output_path, apply_result_path, evaluate_template,
    ResultDisposition,
};
use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::executor::simulated_result;
use crate::retry::{apply_catch, retry_delay, CatchPolicy, RetryPolicy};
use crate::runtime::ExecutionContext;
use crate::states::Transition;

/// A `Type: Task` state.
#[derive(Debug, Clone)]
pub struct TaskState {
    pub name: String,
    pub resource: String,
    pub timeout_seconds: Option<u64>,
    pub heartbeat_seconds: Option<u64>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub parameters: Option<Value>,
    pub result_selector: Option<Value>,
    pub result_path: ResultDisposition,
    pub credentials: Option<String>,
    pub comment: Option<String>,
    pub retry: Vec<RetryPolicy>,
    pub catch: Vec<CatchPolicy>,
    pub transition: Transition,
}

impl TaskState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        let timeout_seconds = definition::opt_positive_u64(name, map, "TimeoutSeconds")?;
        let heartbeat_seconds = definition::opt_positive_u64(name, map, "HeartbeatSeconds")?;
        if let (Some(heartbeat), Some(timeout)) = (heartbeat_seconds, timeout_seconds) {
            if heartbeat >= timeout {
                return Err(definition::invalid_field(
                    name,
                    "HeartbeatSeconds",
                    "must be strictly less than TimeoutSeconds",
                ));
            }
        }
        Ok(Self {
            name: name.to_string(),
            resource: definition::req_str(name, map, "Resource")?,
            timeout_seconds,
            heartbeat_seconds,
            input_path: definition::opt_str(name, map, "InputPath")?,
            output_path: definition::opt_str(name, map, "OutputPath")?,
            parameters: map.get("Parameters").cloned(),
            result_selector: map.get("ResultSelector").cloned(),
            result_path: ResultDisposition::from_def(name, map, "ResultPath")?,
            credentials: definition::opt_str(name, map, "Credentials")?,
            comment: definition::opt_str(name, map, "Comment")?,
            retry: RetryPolicy::list_from_def(name, map)?,
            catch: CatchPolicy::list_from_def(name, map)?,
            transition: Transition::from_def(name, map)?,
        })
    }

    pub(crate) async fn execute(
        &self,
        input: &Value,
        ctx: &mut ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        let effective = apply_input_path(input, self.input_path.as_deref());
        let params = match &self.parameters {
            Some(template) => evaluate_template(template, &effective),
            None => effective,
        };
        match self.invoke_with_retry(&params, ctx).await {
            Ok(raw) => {
                let selected = match &self.result_selector {
                    Some(template) => evaluate_template(template, &raw),
                    None => raw,
                };
                let placed = apply_result_path(input, selected, &self.result_path);
                Ok(apply_output_path(placed, self.output_path.as_deref()))
            }
            Err(err) => match apply_catch(&self.catch, &self.result_path, input, &err, ctx) {
                Some(redirected) => Ok(redirected),
                None => Err(err),
            },
        }
    }

    /// Invoke the resource, re-executing under the retry policy until it
    /// succeeds, the policy is exhausted, or no policy matches.
    async fn invoke_with_retry(
        &self,
        params: &Value,
        ctx: &mut ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        loop {
            let attempt = ctx.record_attempt(&self.name);
            match self.invoke_once(params, ctx).await {
                Ok(value) => return Ok(value),
                Err(err) => match retry_delay(&self.retry, &err, attempt) {
                    Some(delay) => {
                        debug!(
                            state = %self.name,
                            attempt,
                            delay_secs = delay.as_secs_f64(),
                            error = %err.error_name(),
                            "retrying task"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// One invocation under the configured deadline, with the heartbeat
    /// monitor running alongside. The monitor is aborted on every exit path.
    async fn invoke_once(
        &self,
        params: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        let heartbeat = self.heartbeat_seconds.map(|seconds| {
            let state = self.name.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(seconds));
                // the first tick completes immediately
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    debug!(state = %state, "task heartbeat");
                }
            })
        });

        let invocation = self.call_resource(params, ctx);
        let outcome = match self.timeout_seconds {
            Some(seconds) => {
                match tokio::time::timeout(Duration::from_secs(seconds), invocation).await {
                    Ok(result) => result,
                    Err(_) => Err(ExecutionError::TaskTimeout {
                        state: self.name.clone(),
                        seconds,
                    }),
                }
            }
            None => invocation.await,
        };

        if let Some(monitor) = heartbeat {
            monitor.abort();
        }
        outcome
    }

    async fn call_resource(
        &self,
        params: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        match ctx.executor() {
            Some(executor) => executor
                .invoke(&self.resource, params.clone(), self.credentials.as_deref())
                .await
                .map_err(|failure| ExecutionError::TaskFailed {
                    error: failure.error,
                    cause: failure.cause,
                }),
            None => Ok(simulated_result(&self.resource, params)),
        }
    }
}
