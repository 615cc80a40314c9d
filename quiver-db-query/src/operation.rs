//! Operation trait and cached-evaluation operator tree.
//!
//! Operators form a tree. Each node exposes two faces:
//!
//! - the **planner face**: estimates, sortedness, width, variable-to-column
//!   mapping and a deterministic cache key, all available without evaluating
//!   anything;
//! - the **evaluation face**: `compute_result`, producing the materialized
//!   [`ResultTable`] exactly once per tree node (results are memoized on the
//!   [`OperatorTree`] wrapper, which is also the unit the engine-level result
//!   cache keys on).
//!
//! # Cache Key Contract
//!
//! Two operations with equal cache keys MUST produce equivalent results
//! (equal multisets of rows, equal declared sort order). Keys are plain
//! strings composed from an operator tag and the keys of all children.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::result::ResultTable;
use crate::variable::VariableColumns;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Query operator, planner-facing and evaluation-facing.
pub trait Operation: Send + Sync {
    /// Human-readable operator name for plan output.
    fn descriptor(&self) -> String;

    /// Number of columns of the result table.
    fn result_width(&self) -> usize;

    /// Columns the result is sorted on (primary key first); empty when no
    /// order is guaranteed.
    fn result_sorted_on(&self) -> Vec<usize>;

    /// Estimated number of result rows.
    fn size_estimate(&self) -> u64;

    /// Estimated total cost of evaluating this subtree.
    fn cost_estimate(&self) -> u64;

    /// Estimated multiplicity of a column (average number of rows per
    /// distinct value); 1.0 when unknown.
    fn multiplicity(&self, col: usize) -> f64;

    /// True when the result is known to be empty without evaluation.
    fn known_empty_result(&self) -> bool {
        false
    }

    /// Deterministic identity of this operator for the result cache.
    fn cache_key(&self) -> String;

    /// Mapping from this operator's visible variables to output columns.
    fn variable_columns(&self) -> &VariableColumns;

    /// Child subtrees in a deterministic order.
    fn children(&self) -> Vec<&Arc<OperatorTree>>;

    /// Evaluate the operator, materializing its result.
    fn compute_result(&self, ctx: &ExecutionContext) -> Result<ResultTable>;
}

/// Tree node owning an [`Operation`] and memoizing its result.
///
/// Children are shared (`Arc`), so rewrites that build new parents reuse
/// evaluated subtrees. A tree evaluates its operation at most once; all
/// later calls to [`result`](Self::result) return the shared table.
pub struct OperatorTree {
    root: Box<dyn Operation>,
    cached: OnceCell<Arc<ResultTable>>,
}

impl OperatorTree {
    /// Wrap an operation in a shareable tree node.
    pub fn new(root: impl Operation + 'static) -> Arc<Self> {
        Arc::new(Self {
            root: Box::new(root),
            cached: OnceCell::new(),
        })
    }

    /// The operation at this node.
    pub fn root(&self) -> &dyn Operation {
        self.root.as_ref()
    }

    /// Evaluate (or return the memoized) result of this subtree.
    ///
    /// A failed evaluation is not memoized; callers that retry after an
    /// error re-evaluate.
    pub fn result(&self, ctx: &ExecutionContext) -> Result<Arc<ResultTable>> {
        self.cached
            .get_or_try_init(|| self.root.compute_result(ctx).map(Arc::new))
            .cloned()
    }

    /// See [`Operation::descriptor`].
    pub fn descriptor(&self) -> String {
        self.root.descriptor()
    }

    /// See [`Operation::result_width`].
    pub fn result_width(&self) -> usize {
        self.root.result_width()
    }

    /// See [`Operation::result_sorted_on`].
    pub fn result_sorted_on(&self) -> Vec<usize> {
        self.root.result_sorted_on()
    }

    /// See [`Operation::size_estimate`].
    pub fn size_estimate(&self) -> u64 {
        self.root.size_estimate()
    }

    /// See [`Operation::cost_estimate`].
    pub fn cost_estimate(&self) -> u64 {
        self.root.cost_estimate()
    }

    /// See [`Operation::multiplicity`].
    pub fn multiplicity(&self, col: usize) -> f64 {
        self.root.multiplicity(col)
    }

    /// See [`Operation::known_empty_result`].
    pub fn known_empty_result(&self) -> bool {
        self.root.known_empty_result()
    }

    /// See [`Operation::cache_key`].
    pub fn cache_key(&self) -> String {
        self.root.cache_key()
    }

    /// See [`Operation::variable_columns`].
    pub fn variable_columns(&self) -> &VariableColumns {
        self.root.variable_columns()
    }
}

impl std::fmt::Debug for OperatorTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorTree")
            .field("descriptor", &self.root.descriptor())
            .field("evaluated", &self.cached.get().is_some())
            .finish()
    }
}
