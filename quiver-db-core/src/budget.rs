//! Per-query memory budget.
//!
//! Containers that grow in proportion to input size charge their allocations
//! here, so that exceeding the query budget surfaces as a recoverable query
//! error rather than exhausting process memory.
//!
//! The handle is cheap to clone and pass around. An unlimited budget is a
//! single `None` pointer; consulting it is a null check.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// The per-query memory budget was exceeded.
#[derive(Debug, Clone, Error)]
#[error("memory budget exceeded: requested {requested} bytes, limit is {limit} bytes")]
pub struct MemoryExceededError {
    /// The configured budget in bytes.
    pub limit: usize,
    /// The total that the failed reservation would have reached.
    pub requested: usize,
}

struct BudgetInner {
    limit: usize,
    allocated: AtomicUsize,
    peak: AtomicUsize,
}

/// Memory budget handle shared by every container built during one query
/// evaluation.
#[derive(Clone, Default)]
pub struct MemoryBudget(Option<Arc<BudgetInner>>);

impl MemoryBudget {
    /// A budget capped at `limit` bytes.
    pub fn limited(limit: usize) -> Self {
        Self(Some(Arc::new(BudgetInner {
            limit,
            allocated: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })))
    }

    /// An unlimited budget (no accounting beyond a null check).
    pub fn unlimited() -> Self {
        Self(None)
    }

    /// True when this budget enforces a limit.
    #[inline]
    pub fn is_limited(&self) -> bool {
        self.0.is_some()
    }

    /// Reserve `bytes` against the budget.
    ///
    /// On breach the reservation is rolled back and an error is returned;
    /// the budget stays usable (callers typically abandon the query, but
    /// sibling operators sharing the handle are not corrupted).
    #[inline]
    pub fn try_reserve(&self, bytes: usize) -> Result<(), MemoryExceededError> {
        let Some(inner) = &self.0 else {
            return Ok(());
        };

        let new_total = inner.allocated.fetch_add(bytes, Ordering::Relaxed) + bytes;
        inner.peak.fetch_max(new_total, Ordering::Relaxed);

        if new_total > inner.limit {
            inner.allocated.fetch_sub(bytes, Ordering::Relaxed);
            return Err(MemoryExceededError {
                limit: inner.limit,
                requested: new_total,
            });
        }
        Ok(())
    }

    /// Return `bytes` to the budget.
    ///
    /// Callers track how much they reserved; releasing more than was
    /// reserved is a bug on their side.
    #[inline]
    pub fn release(&self, bytes: usize) {
        if let Some(inner) = &self.0 {
            inner.allocated.fetch_sub(bytes, Ordering::Relaxed);
        }
    }

    /// Currently reserved bytes (0 for an unlimited budget).
    pub fn allocated(&self) -> usize {
        self.0
            .as_ref()
            .map(|i| i.allocated.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Peak reserved bytes (0 for an unlimited budget).
    pub fn peak(&self) -> usize {
        self.0
            .as_ref()
            .map(|i| i.peak.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// The configured limit, or `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        self.0.as_ref().map(|i| i.limit)
    }
}

impl std::fmt::Debug for MemoryBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            None => f.write_str("MemoryBudget(unlimited)"),
            Some(inner) => f
                .debug_struct("MemoryBudget")
                .field("limit", &inner.limit)
                .field("allocated", &inner.allocated.load(Ordering::Relaxed))
                .field("peak", &inner.peak.load(Ordering::Relaxed))
                .finish(),
        }
    }
}
