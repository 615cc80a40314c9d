//! Materialized operator results.

use quiver_db_core::{IdTable, LocalVocab};
use std::sync::Arc;

/// The materialized result of evaluating one operator.
///
/// Bundles the id table with its declared sort order and the local
/// vocabulary that travels with it. The declared sort order lists column
/// indexes, primary key first; an empty list means no order is guaranteed.
#[derive(Debug, Clone)]
pub struct ResultTable {
    id_table: IdTable,
    sorted_on: Vec<usize>,
    local_vocab: Arc<LocalVocab>,
}

impl ResultTable {
    /// Bundle a table with its sort metadata and local vocabulary.
    pub fn new(id_table: IdTable, sorted_on: Vec<usize>, local_vocab: Arc<LocalVocab>) -> Self {
        Self {
            id_table,
            sorted_on,
            local_vocab,
        }
    }

    /// The result rows.
    pub fn id_table(&self) -> &IdTable {
        &self.id_table
    }

    /// Declared sort order (column indexes, primary key first).
    pub fn sorted_on(&self) -> &[usize] {
        &self.sorted_on
    }

    /// The local vocabulary travelling with this result.
    pub fn local_vocab(&self) -> &Arc<LocalVocab> {
        &self.local_vocab
    }
}
