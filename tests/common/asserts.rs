#![allow(dead_code)]

use stateweave::runtime::{Execution, ExecutionStatus};

pub fn assert_history(execution: &Execution, expected: &[&str]) {
    let visited: Vec<&str> = execution
        .history
        .iter()
        .map(|entry| entry.state_name.as_str())
        .collect();
    assert_eq!(
        visited, expected,
        "history order mismatch for execution '{}'",
        execution.name
    );
}

pub fn assert_succeeded(execution: &Execution) {
    assert_eq!(
        execution.status,
        ExecutionStatus::Succeeded,
        "expected success, got error={:?} cause={:?}",
        execution.error,
        execution.cause
    );
}

pub fn assert_failed_with(execution: &Execution, error: &str) {
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.error.as_deref(), Some(error));
}
