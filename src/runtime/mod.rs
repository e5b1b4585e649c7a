//! Execution runtime: the mutable execution record, the per-execution
//! context bag, and the driver loop that advances a machine state by state.
//!
//! - [`Execution`] owns everything observable about one run: status, current
//!   state, output, history, error codes, and timing.
//! - [`ExecutionContext`] is the capability bag states execute against: the
//!   task executor, per-state attempt counters, and the next-state override
//!   slot catch policies use to redirect the driver.
//! - The driver operations live as `impl StateMachine` blocks in the
//!   driver module: `start_execution`, `run_next`, `run_all`.

mod context;
mod driver;
mod execution;

pub use context::ExecutionContext;
pub use execution::{Execution, ExecutionStatus, HistoryEntry};
