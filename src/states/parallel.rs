//! Parallel states: fan a value out over nested machines, fan results in.
//!
//! Every branch is a complete nested state machine, validated at
//! construction. On execution each branch runs as a child execution with a
//! shallow copy of the parent context, spawned onto the runtime. Results are
//! collected in branch-declaration order regardless of completion order;
//! the first failure aborts outstanding siblings and surfaces as
//! `BranchFailed`, which the state's own `Retry`/`Catch` lists may absorb.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::dataflow::{
    apply_input_path, apply_output_path, apply_result_path, evaluate_template,
    ResultDisposition,
};
use crate::definition::{self, DefinitionError};
use crate::errors::ExecutionError;
use crate::machine::StateMachine;
use crate::retry::{apply_catch, retry_delay, CatchPolicy, RetryPolicy};
use crate::runtime::{ExecutionContext, ExecutionStatus};
use crate::states::Transition;

/// A `Type: Parallel` state.
#[derive(Debug, Clone)]
pub struct ParallelState {
    pub name: String,
    pub branches: Vec<Arc<StateMachine>>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_selector: Option<Value>,
    pub result_path: ResultDisposition,
    pub comment: Option<String>,
    pub retry: Vec<RetryPolicy>,
    pub catch: Vec<CatchPolicy>,
    pub transition: Transition,
}

impl ParallelState {
    pub(crate) fn from_def(
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Self, DefinitionError> {
        let raw = map.get("Branches").ok_or(DefinitionError::MissingField {
            state: name.to_string(),
            field: "Branches",
        })?;
        let entries = raw.as_array().ok_or_else(|| {
            definition::invalid_field(name, "Branches", "expected a list of branch definitions")
        })?;
        if entries.is_empty() {
            return Err(definition::invalid_field(name, "Branches", "must not be empty"));
        }
        let branches = entries
            .iter()
            .enumerate()
            .map(|(index, branch)| {
                StateMachine::from_value(branch)
                    .map(Arc::new)
                    .map_err(|source| DefinitionError::InvalidBranch {
                        state: name.to_string(),
                        index,
                        source: Box::new(source),
                    })
            })
            .collect::<Result<Vec<_>, DefinitionError>>()?;
        Ok(Self {
            name: name.to_string(),
            branches,
            input_path: definition::opt_str(name, map, "InputPath")?,
            output_path: definition::opt_str(name, map, "OutputPath")?,
            result_selector: map.get("ResultSelector").cloned(),
            result_path: ResultDisposition::from_def(name, map, "ResultPath")?,
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
        match self.run_branches_with_retry(&effective, ctx).await {
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

    async fn run_branches_with_retry(
        &self,
        effective: &Value,
        ctx: &mut ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        loop {
            let attempt = ctx.record_attempt(&self.name);
            match self.run_branches_once(effective, ctx).await {
                Ok(outputs) => return Ok(outputs),
                Err(err) => match retry_delay(&self.retry, &err, attempt) {
                    Some(delay) => {
                        debug!(
                            state = %self.name,
                            attempt,
                            delay_secs = delay.as_secs_f64(),
                            error = %err.error_name(),
                            "retrying parallel branches"
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

    /// Spawn every branch and join in completion order so a failure is seen
    /// as soon as it happens; outstanding siblings are aborted, not awaited.
    /// Successful outputs land in a slot per declared branch index, so the
    /// result array always follows declaration order.
    async fn run_branches_once(
        &self,
        effective: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        let mut children = tokio::task::JoinSet::new();
        for (index, branch) in self.branches.iter().enumerate() {
            let machine = Arc::clone(branch);
            let child_ctx = ctx.child();
            let branch_input = effective.clone();
            children.spawn(async move {
                let mut child = machine.start_execution_with(branch_input, None, child_ctx);
                machine.run_all(&mut child).await;
                (index, child)
            });
        }

        let mut outputs: Vec<Option<Value>> = vec![None; self.branches.len()];
        while let Some(joined) = children.join_next().await {
            match joined {
                Ok((index, child)) => match child.status {
                    ExecutionStatus::Succeeded => outputs[index] = Some(child.output),
                    _ => {
                        children.abort_all();
                        return Err(ExecutionError::BranchFailed {
                            branch: index,
                            error: child.error.unwrap_or_else(|| "BranchFailed".to_string()),
                            cause: child
                                .cause
                                .unwrap_or_else(|| "branch execution failed".to_string()),
                        });
                    }
                },
                Err(join_error) => {
                    children.abort_all();
                    let branch = outputs.iter().position(Option::is_none).unwrap_or(0);
                    return Err(ExecutionError::BranchFailed {
                        branch,
                        error: "BranchFailed".to_string(),
                        cause: join_error.to_string(),
                    });
                }
            }
        }
        Ok(Value::Array(outputs.into_iter().flatten().collect()))
    }
}
