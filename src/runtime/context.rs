//! The capability bag an execution carries between states.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use crate::executor::TaskExecutor;

/// Per-execution context passed to every state.
///
/// The context is mutated only by the driver and the state currently
/// executing; Parallel branches receive a shallow copy through
/// [`child`](Self::child), sharing the executor capability but never the
/// parent's override slot.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    executor: Option<Arc<dyn TaskExecutor>>,
    attempts: FxHashMap<String, u32>,
    next_override: Option<String>,
    current_state: Option<String>,
    entered_at: Option<DateTime<Utc>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the host's task executor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use async_trait::async_trait;
    /// use serde_json::{json, Value};
    /// use stateweave::executor::{TaskExecutor, TaskFailure};
    /// use stateweave::runtime::ExecutionContext;
    ///
    /// struct Fixed;
    ///
    /// #[async_trait]
    /// impl TaskExecutor for Fixed {
    ///     async fn invoke(
    ///         &self,
    ///         _resource: &str,
    ///         _input: Value,
    ///         _credentials: Option<&str>,
    ///     ) -> Result<Value, TaskFailure> {
    ///         Ok(json!(42))
    ///     }
    /// }
    ///
    /// let context = ExecutionContext::new().with_executor(Arc::new(Fixed));
    /// assert!(context.executor().is_some());
    /// ```
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// The registered task executor, when the host supplied one.
    #[must_use]
    pub fn executor(&self) -> Option<&Arc<dyn TaskExecutor>> {
        self.executor.as_ref()
    }

    /// Record that a state has been entered.
    pub(crate) fn enter_state(&mut self, name: &str) {
        self.current_state = Some(name.to_string());
        self.entered_at = Some(Utc::now());
    }

    /// Name of the state currently executing, if any.
    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    /// When the current state was entered.
    #[must_use]
    pub fn entered_at(&self) -> Option<DateTime<Utc>> {
        self.entered_at
    }

    /// Count one more invocation attempt for `state`, returning the new
    /// 1-indexed total.
    pub(crate) fn record_attempt(&mut self, state: &str) -> u32 {
        let count = self.attempts.entry(state.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Attempts recorded so far for `state`.
    #[must_use]
    pub fn attempts_for(&self, state: &str) -> u32 {
        self.attempts.get(state).copied().unwrap_or(0)
    }

    /// Announce a catch redirect; the driver consumes it after the state
    /// returns.
    pub(crate) fn set_next_override(&mut self, target: &str) {
        self.next_override = Some(target.to_string());
    }

    /// Consume the pending redirect, if any.
    pub(crate) fn take_next_override(&mut self) -> Option<String> {
        self.next_override.take()
    }

    /// Shallow copy for a Parallel branch child: capabilities and counters
    /// carry over, per-state bookkeeping does not.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            attempts: self.attempts.clone(),
            next_override: None,
            current_state: None,
            entered_at: None,
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("executor", &self.executor.as_ref().map(|_| "<dyn TaskExecutor>"))
            .field("attempts", &self.attempts)
            .field("next_override", &self.next_override)
            .field("current_state", &self.current_state)
            .field("entered_at", &self.entered_at)
            .finish()
    }
}
