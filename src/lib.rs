//! # Stateweave: an Amazon States Language workflow interpreter
//!
//! Stateweave executes state machines written in the Amazon States Language
//! dialect: a JSON or YAML document describing a directed graph of typed
//! states connected by transitions. The engine covers the seven state types
//! (Task, Choice, Wait, Parallel, Pass, Succeed, Fail), the JSON data-flow
//! pipeline threading values between states, retry/catch error routing with
//! backoff, task deadlines with heartbeat monitoring, and parallel branch
//! fan-out with ordered fan-in.
//!
//! ## Core Concepts
//!
//! - **Machine**: a validated definition — [`machine::StateMachine`] is
//!   built once and reused across executions.
//! - **Execution**: one mutable run of a machine —
//!   [`runtime::Execution`] tracks status, current state, output, and an
//!   append-only history.
//! - **Executor**: the host callback Task states invoke —
//!   [`executor::TaskExecutor`]; without one, tasks synthesize simulated
//!   results.
//! - **Data flow**: every state's output is shaped by the
//!   InputPath → Parameters → result → ResultSelector → ResultPath →
//!   OutputPath pipeline in [`dataflow`].
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use stateweave::machine::StateMachine;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let machine = StateMachine::from_value(&json!({
//!     "StartAt": "Greet",
//!     "States": {
//!         "Greet": {
//!             "Type": "Pass",
//!             "Parameters": {"message": "States.Format('hello {}', $.who)"},
//!             "End": true
//!         }
//!     }
//! }))?;
//!
//! let mut execution = machine.start_execution(json!({"who": "world"}));
//! machine.run_all(&mut execution).await;
//!
//! assert_eq!(execution.output, json!({"message": "hello world"}));
//! # Ok(())
//! # }
//! ```
//!
//! ## Plugging in a Task Executor
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use stateweave::executor::{TaskExecutor, TaskFailure};
//! use stateweave::machine::StateMachine;
//! use stateweave::runtime::ExecutionContext;
//!
//! struct EchoExecutor;
//!
//! #[async_trait]
//! impl TaskExecutor for EchoExecutor {
//!     async fn invoke(
//!         &self,
//!         resource: &str,
//!         input: Value,
//!         _credentials: Option<&str>,
//!     ) -> Result<Value, TaskFailure> {
//!         Ok(json!({"resource": resource, "echo": input}))
//!     }
//! }
//!
//! # async fn example(machine: StateMachine) {
//! let context = ExecutionContext::new().with_executor(Arc::new(EchoExecutor));
//! let mut execution = machine.start_execution_with(json!({}), None, context);
//! machine.run_all(&mut execution).await;
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`machine`] - Definition validation and the [`machine::StateMachine`] type
//! - [`states`] - The seven state variants and their shared contract
//! - [`runtime`] - Execution record, context bag, and the driver loop
//! - [`dataflow`] - The input/output shaping pipeline
//! - [`paths`] - The restricted JSONPath dialect
//! - [`intrinsics`] - `States.*` functions embedded in parameter strings
//! - [`retry`] - Retry backoff and catch redirection policies
//! - [`executor`] - The task resource callout boundary
//! - [`errors`] / [`definition`] - Runtime and build-time error taxonomies
//! - [`telemetry`] - Optional tracing bootstrap

pub mod dataflow;
pub mod definition;
pub mod errors;
pub mod executor;
pub mod intrinsics;
pub mod machine;
pub mod paths;
pub mod retry;
pub mod runtime;
pub mod states;
pub mod telemetry;
