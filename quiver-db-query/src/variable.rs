//! Variables and their output-column mapping.
//!
//! Maps symbolic variable names (e.g. `?s`, `?reachable`) to the output
//! columns of an operator's result table. The mapping is small and queried
//! at planning time, so it is kept as an ordered vector: iteration order is
//! insertion order, which downstream code relies on when appending
//! carry-over columns.

use std::fmt;
use std::sync::Arc;

/// Symbolic query variable.
///
/// Uses `Arc<str>` for cheap cloning; names include the leading `?`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(Arc<str>);

impl Variable {
    /// Create a variable from its name.
    ///
    /// Names conventionally start with `?`; this is asserted in debug
    /// builds to catch accidental IRI/variable mixups early.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        debug_assert!(
            name.starts_with('?'),
            "variable names start with '?', got {name:?}"
        );
        Self(Arc::from(name))
    }

    /// The variable's name, including the leading `?`.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered mapping from variables to output columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableColumns {
    cols: Vec<(Variable, usize)>,
}

impl VariableColumns {
    /// A new, empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable at an output column.
    ///
    /// # Panics
    ///
    /// Panics if the variable is already mapped; operators never expose the
    /// same variable in two columns.
    pub fn insert(&mut self, var: Variable, col: usize) {
        assert!(
            !self.contains(&var),
            "variable {var} is already mapped to a column"
        );
        self.cols.push((var, col));
    }

    /// The output column of a variable, if mapped.
    pub fn column_of(&self, var: &Variable) -> Option<usize> {
        self.cols.iter().find(|(v, _)| v == var).map(|(_, c)| *c)
    }

    /// Whether a variable is mapped.
    pub fn contains(&self, var: &Variable) -> bool {
        self.cols.iter().any(|(v, _)| v == var)
    }

    /// Iterate `(variable, column)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, usize)> {
        self.cols.iter().map(|(v, c)| (v, *c))
    }

    /// Number of mapped variables.
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    /// True when nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut vc = VariableColumns::new();
        vc.insert(Variable::new("?x"), 0);
        vc.insert(Variable::new("?y"), 1);

        assert_eq!(vc.column_of(&Variable::new("?x")), Some(0));
        assert_eq!(vc.column_of(&Variable::new("?y")), Some(1));
        assert_eq!(vc.column_of(&Variable::new("?z")), None);
        assert_eq!(vc.len(), 2);
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut vc = VariableColumns::new();
        vc.insert(Variable::new("?b"), 2);
        vc.insert(Variable::new("?a"), 0);

        let order: Vec<_> = vc.iter().map(|(v, c)| (v.name().to_string(), c)).collect();
        assert_eq!(order, vec![("?b".to_string(), 2), ("?a".to_string(), 0)]);
    }

    #[test]
    #[should_panic(expected = "already mapped")]
    fn test_duplicate_insert_panics() {
        let mut vc = VariableColumns::new();
        vc.insert(Variable::new("?x"), 0);
        vc.insert(Variable::new("?x"), 1);
    }
}
