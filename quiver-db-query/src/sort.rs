//! Sort operation enforcing a column order on a child result
//!
//! The `SortOperation` is a blocking operator: it materializes its child,
//! sorts the rows lexicographically by the requested key columns (by id bit
//! pattern), and re-declares the result's sort order. Operators with sorted
//! input preconditions are planned on top of [`create_sorted_tree`], which
//! inserts the sort only when the child's declared order does not already
//! satisfy the request.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::operation::{Operation, OperatorTree};
use crate::result::ResultTable;
use crate::variable::VariableColumns;
use quiver_db_core::{Id, IdTable};
use std::cmp::Ordering;
use std::sync::Arc;

/// Blocking sort of a child subtree by key columns (primary first).
pub struct SortOperation {
    child: Arc<OperatorTree>,
    sort_cols: Vec<usize>,
}

impl SortOperation {
    /// Sort `child` by `sort_cols`, primary key first.
    ///
    /// # Panics
    ///
    /// Panics if `sort_cols` is empty or references a column outside the
    /// child's width.
    pub fn new(child: Arc<OperatorTree>, sort_cols: Vec<usize>) -> Self {
        assert!(!sort_cols.is_empty(), "sort requires at least one column");
        let width = child.result_width();
        assert!(
            sort_cols.iter().all(|&c| c < width),
            "sort column out of range for child width {width}"
        );
        Self { child, sort_cols }
    }
}

impl Operation for SortOperation {
    fn descriptor(&self) -> String {
        format!("Sort on {:?}", self.sort_cols)
    }

    fn result_width(&self) -> usize {
        self.child.result_width()
    }

    fn result_sorted_on(&self) -> Vec<usize> {
        self.sort_cols.clone()
    }

    fn size_estimate(&self) -> u64 {
        self.child.size_estimate()
    }

    fn cost_estimate(&self) -> u64 {
        // n log n for the sort itself, on top of producing the child.
        let n = self.child.size_estimate();
        let log = u64::from(u64::BITS - n.max(1).leading_zeros());
        self.child.cost_estimate().saturating_add(n.saturating_mul(log))
    }

    fn multiplicity(&self, col: usize) -> f64 {
        self.child.multiplicity(col)
    }

    fn known_empty_result(&self) -> bool {
        self.child.known_empty_result()
    }

    fn cache_key(&self) -> String {
        format!(
            "SORT on {:?} ( {} )",
            self.sort_cols,
            self.child.cache_key()
        )
    }

    fn variable_columns(&self) -> &VariableColumns {
        self.child.variable_columns()
    }

    fn children(&self) -> Vec<&Arc<OperatorTree>> {
        vec![&self.child]
    }

    fn compute_result(&self, ctx: &ExecutionContext) -> Result<ResultTable> {
        let input = self.child.result(ctx)?;
        let table = input.id_table();

        let num_rows = table.num_rows();
        ctx.budget
            .try_reserve(num_rows * (std::mem::size_of::<usize>() + table.num_columns() * std::mem::size_of::<Id>()))?;

        // Sort a row permutation, then apply it column-wise. The sort is
        // stable, so rows equal on the key columns keep their input order.
        let mut perm: Vec<usize> = (0..num_rows).collect();
        perm.sort_by(|&a, &b| {
            for &col in &self.sort_cols {
                match table.at(a, col).cmp(&table.at(b, col)) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        });

        let mut sorted = IdTable::new(table.num_columns());
        sorted.reserve(num_rows);
        for &row in &perm {
            ctx.cancellation.check()?;
            let r = sorted.push_empty_row();
            for col in 0..table.num_columns() {
                sorted.set(r, col, table.at(row, col));
            }
        }

        Ok(ResultTable::new(
            sorted,
            self.sort_cols.clone(),
            Arc::clone(input.local_vocab()),
        ))
    }
}

/// Return a tree whose result is sorted on `sort_cols` (primary first).
///
/// When the child's declared sort order already begins with the requested
/// columns the child is returned unchanged; otherwise it is wrapped in a
/// [`SortOperation`].
pub fn create_sorted_tree(tree: Arc<OperatorTree>, sort_cols: &[usize]) -> Arc<OperatorTree> {
    let existing = tree.result_sorted_on();
    if existing.len() >= sort_cols.len() && existing[..sort_cols.len()] == *sort_cols {
        return tree;
    }
    OperatorTree::new(SortOperation::new(tree, sort_cols.to_vec()))
}
