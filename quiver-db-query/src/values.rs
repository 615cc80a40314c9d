//! VALUES operation - a constant relation
//!
//! Injects a fixed id table into the plan. Hosts use it to seed plans with
//! inline solutions; the planner also hands such relations to the transitive
//! path operator as bound-side inputs.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::operation::{Operation, OperatorTree};
use crate::result::ResultTable;
use crate::variable::{Variable, VariableColumns};
use quiver_db_core::{IdTable, LocalVocab};
use std::fmt::Write as _;
use std::sync::Arc;

/// Constant relation over a fixed id table.
pub struct ValuesOperation {
    table: IdTable,
    variables: VariableColumns,
    sorted_on: Vec<usize>,
    local_vocab: Arc<LocalVocab>,
}

impl ValuesOperation {
    /// Create a constant relation; `variables` names the columns in order.
    ///
    /// # Panics
    ///
    /// Panics if the number of variables differs from the table width.
    pub fn new(table: IdTable, variables: Vec<Variable>) -> Self {
        assert_eq!(
            variables.len(),
            table.num_columns(),
            "one variable per column required"
        );
        let mut cols = VariableColumns::new();
        for (i, var) in variables.into_iter().enumerate() {
            cols.insert(var, i);
        }
        Self {
            table,
            variables: cols,
            sorted_on: Vec::new(),
            local_vocab: Arc::new(LocalVocab::new()),
        }
    }

    /// Declare the table as sorted on the given columns (primary first).
    ///
    /// The caller asserts that the rows actually are in that order.
    pub fn with_sorted_on(mut self, sorted_on: Vec<usize>) -> Self {
        self.sorted_on = sorted_on;
        self
    }

    /// Attach a local vocabulary to travel with the result.
    pub fn with_local_vocab(mut self, local_vocab: Arc<LocalVocab>) -> Self {
        self.local_vocab = local_vocab;
        self
    }
}

impl Operation for ValuesOperation {
    fn descriptor(&self) -> String {
        format!(
            "Values ({} rows, {} cols)",
            self.table.num_rows(),
            self.table.num_columns()
        )
    }

    fn result_width(&self) -> usize {
        self.table.num_columns()
    }

    fn result_sorted_on(&self) -> Vec<usize> {
        self.sorted_on.clone()
    }

    fn size_estimate(&self) -> u64 {
        self.table.num_rows() as u64
    }

    fn cost_estimate(&self) -> u64 {
        self.table.num_rows() as u64
    }

    fn multiplicity(&self, _col: usize) -> f64 {
        1.0
    }

    fn known_empty_result(&self) -> bool {
        self.table.is_empty()
    }

    fn cache_key(&self) -> String {
        let mut key = format!("VALUES width {} sorted {:?} rows", self.table.num_columns(), self.sorted_on);
        for row in self.table.rows() {
            key.push_str(" (");
            for id in row {
                let _ = write!(key, " {id}");
            }
            key.push_str(" )");
        }
        key
    }

    fn variable_columns(&self) -> &VariableColumns {
        &self.variables
    }

    fn children(&self) -> Vec<&Arc<OperatorTree>> {
        Vec::new()
    }

    fn compute_result(&self, _ctx: &ExecutionContext) -> Result<ResultTable> {
        Ok(ResultTable::new(
            self.table.clone(),
            self.sorted_on.clone(),
            Arc::clone(&self.local_vocab),
        ))
    }
}
