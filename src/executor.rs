//! The task-resource callout boundary.
//!
//! Task states invoke an opaque resource through a caller-supplied
//! [`TaskExecutor`]. The engine never interprets the resource string; it
//! forwards it together with the evaluated parameters and any credentials,
//! and threads the returned value into the data-flow pipeline.
//!
//! When no executor is registered on the execution context, Task states fall
//! back to [`simulated_result`], a canonical stub that keeps definitions
//! runnable in tests and demos.
//!
//! # Examples
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use stateweave::executor::{TaskExecutor, TaskFailure};
//!
//! struct HttpExecutor;
//!
//! #[async_trait]
//! impl TaskExecutor for HttpExecutor {
//!     async fn invoke(
//!         &self,
//!         resource: &str,
//!         input: Value,
//!         _credentials: Option<&str>,
//!     ) -> Result<Value, TaskFailure> {
//!         if resource.starts_with("https://") {
//!             Ok(json!({"posted": input}))
//!         } else {
//!             Err(TaskFailure::new("UnsupportedResource", resource))
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::{json, Value};
use thiserror::Error;

/// A failure reported by the host executor.
///
/// `error` is the host-defined class name (matched by `ErrorEquals`
/// entries), `cause` the human-readable message.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{error}: {cause}")]
#[diagnostic(code(stateweave::executor::task_failure))]
pub struct TaskFailure {
    pub error: String,
    pub cause: String,
}

impl TaskFailure {
    pub fn new(error: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            cause: cause.into(),
        }
    }
}

/// Host-supplied callback invoked for every Task state resource.
///
/// Implementations must be safe to share across parallel branches; the
/// engine passes the executor around as an `Arc<dyn TaskExecutor>`.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Invoke `resource` with the evaluated task parameters.
    async fn invoke(
        &self,
        resource: &str,
        input: Value,
        credentials: Option<&str>,
    ) -> Result<Value, TaskFailure>;
}

/// The canonical stub result used when no executor is registered.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use stateweave::executor::simulated_result;
///
/// let result = simulated_result("arn:demo", &json!({"q": 1}));
/// assert_eq!(result["task_result"], json!("completed"));
/// assert_eq!(result["resource"], json!("arn:demo"));
/// assert_eq!(result["input_received"], json!({"q": 1}));
/// assert_eq!(result["simulated"], json!(true));
/// ```
#[must_use]
pub fn simulated_result(resource: &str, input: &Value) -> Value {
    json!({
        "task_result": "completed",
        "resource": resource,
        "input_received": input,
        "timestamp": chrono::Utc::now().timestamp(),
        "execution_id": uuid::Uuid::new_v4().to_string(),
        "simulated": true,
    })
}
