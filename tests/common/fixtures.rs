#![allow(dead_code)]

use serde_json::{json, Value};
use stateweave::machine::StateMachine;

/// `StartAt: A; A → B; B End` with two task resources.
pub fn linear_task_chain() -> StateMachine {
    machine(json!({
        "StartAt": "A",
        "States": {
            "A": {"Type": "Task", "Resource": "r1", "Next": "B"},
            "B": {"Type": "Task", "Resource": "r2", "End": true}
        }
    }))
}

/// The order-classification choice machine: total ≥ 1000 → High,
/// ≥ 100 → Medium, < 0 → Invalid (Fail), otherwise Normal.
pub fn order_choice_machine() -> StateMachine {
    machine(json!({
        "StartAt": "CheckOrderValue",
        "States": {
            "CheckOrderValue": {
                "Type": "Choice",
                "Choices": [
                    {"Variable": "$.order.total", "NumericGreaterThanEquals": 1000, "Next": "High"},
                    {"Variable": "$.order.total", "NumericGreaterThanEquals": 100, "Next": "Medium"},
                    {"Variable": "$.order.total", "NumericLessThan": 0, "Next": "Invalid"}
                ],
                "Default": "Normal"
            },
            "High": {"Type": "Succeed"},
            "Medium": {"Type": "Succeed"},
            "Normal": {"Type": "Succeed"},
            "Invalid": {
                "Type": "Fail",
                "Error": "InvalidOrderError",
                "Cause": "Order total cannot be negative"
            }
        }
    }))
}

/// A single-task machine with the given extra task fields merged in.
pub fn single_task(extra: Value) -> StateMachine {
    let mut task = json!({"Type": "Task", "Resource": "worker", "End": true});
    if let (Some(task_map), Some(extra_map)) = (task.as_object_mut(), extra.as_object()) {
        for (key, value) in extra_map {
            task_map.insert(key.clone(), value.clone());
        }
    }
    machine(json!({"StartAt": "Work", "States": {"Work": task}}))
}

pub fn machine(definition: Value) -> StateMachine {
    StateMachine::from_value(&definition).expect("fixture definition must be valid")
}
