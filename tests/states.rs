use serde_json::json;
use stateweave::runtime::ExecutionStatus;

mod common;
use common::*;

#[tokio::test]
async fn pass_with_no_transforms_is_identity() {
    let machine = machine(json!({
        "StartAt": "P",
        "States": {"P": {"Type": "Pass", "End": true}}
    }));
    let input = json!({"a": [1, 2], "b": {"c": null}});
    let mut execution = machine.start_execution(input.clone());
    machine.run_all(&mut execution).await;
    assert_succeeded(&execution);
    assert_eq!(execution.output, input);
}

#[tokio::test]
async fn pass_emits_literal_result() {
    let machine = machine(json!({
        "StartAt": "P",
        "States": {
            "P": {"Type": "Pass", "Result": {"injected": true}, "End": true}
        }
    }));
    let mut execution = machine.start_execution(json!({"ignored": 1}));
    machine.run_all(&mut execution).await;
    assert_eq!(execution.output, json!({"injected": true}));
}

#[tokio::test]
async fn pass_places_result_at_result_path() {
    let machine = machine(json!({
        "StartAt": "P",
        "States": {
            "P": {
                "Type": "Pass",
                "Result": {"status": "ok"},
                "ResultPath": "$.check",
                "End": true
            }
        }
    }));
    let mut execution = machine.start_execution(json!({"kept": 1}));
    machine.run_all(&mut execution).await;
    assert_eq!(execution.output, json!({"kept": 1, "check": {"status": "ok"}}));
}

#[tokio::test]
async fn pass_null_result_path_discards_result() {
    let machine = machine(json!({
        "StartAt": "P",
        "States": {
            "P": {
                "Type": "Pass",
                "Result": {"dropped": true},
                "ResultPath": null,
                "End": true
            }
        }
    }));
    let input = json!({"kept": 1});
    let mut execution = machine.start_execution(input.clone());
    machine.run_all(&mut execution).await;
    assert_eq!(execution.output, input);
}

#[tokio::test]
async fn pass_parameters_reshape_the_input() {
    let machine = machine(json!({
        "StartAt": "P",
        "States": {
            "P": {
                "Type": "Pass",
                "InputPath": "$.order",
                "Parameters": {"id": "$.id", "label": "States.Format('order-{}', $.id)"},
                "End": true
            }
        }
    }));
    let mut execution = machine.start_execution(json!({"order": {"id": 9}}));
    machine.run_all(&mut execution).await;
    assert_eq!(execution.output, json!({"id": 9, "label": "order-9"}));
}

#[tokio::test]
async fn succeed_terminates_with_shaped_output() {
    let machine = machine(json!({
        "StartAt": "S",
        "States": {
            "S": {"Type": "Succeed", "InputPath": "$.payload", "OutputPath": "$.result"}
        }
    }));
    let mut execution = machine.start_execution(json!({"payload": {"v": 3}, "noise": true}));
    machine.run_all(&mut execution).await;
    assert_succeeded(&execution);
    assert_eq!(execution.output, json!({"result": {"v": 3}}));
    assert!(execution.end_time.is_some());
}

#[tokio::test]
async fn fail_terminates_with_declared_codes() {
    let machine = machine(json!({
        "StartAt": "F",
        "States": {
            "F": {"Type": "Fail", "Error": "Deliberate", "Cause": "on purpose"}
        }
    }));
    let input = json!({"seen": true});
    let mut execution = machine.start_execution(input.clone());
    machine.run_all(&mut execution).await;
    assert_failed_with(&execution, "Deliberate");
    assert_eq!(execution.cause.as_deref(), Some("on purpose"));
    // input preserved for history
    assert_eq!(execution.history[0].output, input);
}

#[tokio::test(start_paused = true)]
async fn wait_with_zero_seconds_progresses_immediately() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {"W": {"Type": "Wait", "Seconds": 0, "End": true}}
    }));
    let input = json!({"x": 1});
    let mut execution = machine.start_execution(input.clone());
    machine.run_all(&mut execution).await;
    assert_succeeded(&execution);
    assert_eq!(execution.output, input);
}

#[tokio::test(start_paused = true)]
async fn wait_by_seconds_path_suspends_for_the_resolved_duration() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {"W": {"Type": "Wait", "SecondsPath": "$.delay", "End": true}}
    }));

    // delay 0: immediate
    let started = tokio::time::Instant::now();
    let mut quick = machine.start_execution(json!({"delay": 0}));
    machine.run_all(&mut quick).await;
    assert!(started.elapsed() < std::time::Duration::from_millis(100));

    // delay 1: at least one second on the (paused) clock, and not wildly more
    let started = tokio::time::Instant::now();
    let mut slow = machine.start_execution(json!({"delay": 1}));
    machine.run_all(&mut slow).await;
    let elapsed = started.elapsed();
    assert!(elapsed >= std::time::Duration::from_secs(1), "elapsed {elapsed:?}");
    assert!(elapsed <= std::time::Duration::from_secs(2), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn wait_accepts_stringly_seconds() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {"W": {"Type": "Wait", "Seconds": "2", "End": true}}
    }));
    let started = tokio::time::Instant::now();
    let mut execution = machine.start_execution(json!({}));
    machine.run_all(&mut execution).await;
    assert!(started.elapsed() >= std::time::Duration::from_secs(2));
    assert_succeeded(&execution);
}

#[tokio::test]
async fn wait_with_past_timestamp_does_not_block() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {
            "W": {"Type": "Wait", "Timestamp": "2020-01-01T00:00:00Z", "End": true}
        }
    }));
    let mut execution = machine.start_execution(json!({}));
    machine.run_all(&mut execution).await;
    assert_succeeded(&execution);
}

#[tokio::test]
async fn wait_with_unresolvable_path_fails() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {"W": {"Type": "Wait", "SecondsPath": "$.missing", "End": true}}
    }));
    let mut execution = machine.start_execution(json!({}));
    machine.run_all(&mut execution).await;
    assert_failed_with(&execution, "InvalidWaitConfig");
}

#[tokio::test]
async fn wait_with_negative_runtime_seconds_fails() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {"W": {"Type": "Wait", "SecondsPath": "$.delay", "End": true}}
    }));
    let mut execution = machine.start_execution(json!({"delay": -3}));
    machine.run_all(&mut execution).await;
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.error.as_deref(), Some("InvalidWaitConfig"));
}

#[tokio::test(start_paused = true)]
async fn wait_by_timestamp_path_honors_future_instants() {
    let machine = machine(json!({
        "StartAt": "W",
        "States": {"W": {"Type": "Wait", "TimestampPath": "$.until", "End": true}}
    }));
    let target = (chrono::Utc::now() + chrono::Duration::seconds(1)).to_rfc3339();
    let mut execution = machine.start_execution(json!({"until": target}));
    machine.run_all(&mut execution).await;
    assert_succeeded(&execution);
}
