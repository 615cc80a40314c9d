//! Execution context for query operators
//!
//! The `ExecutionContext` provides the per-query resources operators need
//! during evaluation: the memory budget shared by sibling operators and the
//! cooperative cancellation handle.

use quiver_db_core::{CancellationHandle, MemoryBudget};

/// Per-query execution state threaded through every `compute_result` call.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    /// Memory budget shared by all operators of the query.
    pub budget: MemoryBudget,
    /// Cancellation handle consulted at loop boundaries.
    pub cancellation: CancellationHandle,
}

impl ExecutionContext {
    /// A context with an unlimited budget and a fresh cancellation handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the memory budget.
    pub fn with_budget(mut self, budget: MemoryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the cancellation handle.
    pub fn with_cancellation(mut self, cancellation: CancellationHandle) -> Self {
        self.cancellation = cancellation;
        self
    }
}
