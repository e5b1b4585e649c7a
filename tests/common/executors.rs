#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use stateweave::executor::{TaskExecutor, TaskFailure};

/// Echoes the resource and input back, counting invocations.
#[derive(Default)]
pub struct EchoExecutor {
    pub calls: AtomicU32,
}

#[async_trait]
impl TaskExecutor for EchoExecutor {
    async fn invoke(
        &self,
        resource: &str,
        input: Value,
        _credentials: Option<&str>,
    ) -> Result<Value, TaskFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"resource": resource, "echo": input}))
    }
}

/// Always fails with a fixed error class and cause.
pub struct FailingExecutor {
    pub error: &'static str,
    pub cause: &'static str,
    pub calls: AtomicU32,
}

impl FailingExecutor {
    pub fn new(error: &'static str, cause: &'static str) -> Self {
        Self {
            error,
            cause,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TaskExecutor for FailingExecutor {
    async fn invoke(
        &self,
        _resource: &str,
        _input: Value,
        _credentials: Option<&str>,
    ) -> Result<Value, TaskFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TaskFailure::new(self.error, self.cause))
    }
}

/// Fails with the given error class for the first `failures` calls, then
/// succeeds with `{"ok": true}`.
pub struct FlakyExecutor {
    pub error: &'static str,
    pub remaining_failures: AtomicU32,
    pub calls: AtomicU32,
}

impl FlakyExecutor {
    pub fn new(error: &'static str, failures: u32) -> Self {
        Self {
            error,
            remaining_failures: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TaskExecutor for FlakyExecutor {
    async fn invoke(
        &self,
        _resource: &str,
        _input: Value,
        _credentials: Option<&str>,
    ) -> Result<Value, TaskFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(TaskFailure::new(self.error, "transient failure"));
        }
        Ok(json!({"ok": true}))
    }
}

/// Sleeps for a fixed duration before answering; pairs with a paused clock
/// to exercise task deadlines.
pub struct SlowExecutor {
    pub delay: Duration,
}

#[async_trait]
impl TaskExecutor for SlowExecutor {
    async fn invoke(
        &self,
        resource: &str,
        _input: Value,
        _credentials: Option<&str>,
    ) -> Result<Value, TaskFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(json!({"resource": resource, "slow": true}))
    }
}

/// Records every invocation for later inspection.
#[derive(Default)]
pub struct RecordingExecutor {
    pub invocations: Mutex<Vec<(String, Value, Option<String>)>>,
}

#[async_trait]
impl TaskExecutor for RecordingExecutor {
    async fn invoke(
        &self,
        resource: &str,
        input: Value,
        credentials: Option<&str>,
    ) -> Result<Value, TaskFailure> {
        self.invocations.lock().unwrap().push((
            resource.to_string(),
            input.clone(),
            credentials.map(str::to_string),
        ));
        Ok(json!({"recorded": input}))
    }
}
