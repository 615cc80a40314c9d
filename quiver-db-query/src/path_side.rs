//! Endpoint descriptor for the transitive path operator.
//!
//! A `PathSide` describes one endpoint (left or right) of a path: whether
//! it is a fixed id or a variable, which column of the child table carries
//! its ids, which column of the output table it is written to, and - when
//! the planner has restricted it - the sub-result it is bound to.
//!
//! Exactly one of three states applies to a side: fixed id, unbound
//! variable, or bound variable.

use crate::operation::OperatorTree;
use crate::variable::Variable;
use quiver_db_core::Id;
use std::fmt::Write as _;
use std::sync::Arc;

/// The value of a path endpoint: a literal id or a symbolic variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SideValue {
    /// The endpoint is a fixed term.
    Fixed(Id),
    /// The endpoint is a variable.
    Var(Variable),
}

/// A sub-result restricting the values of a bound side.
#[derive(Clone)]
pub struct BoundInput {
    /// The sub-result supplying the side's values.
    pub tree: Arc<OperatorTree>,
    /// The column of `tree` that joins with the side.
    pub join_col: usize,
}

/// One endpoint of a transitive path.
#[derive(Clone)]
pub struct PathSide {
    pub(crate) value: SideValue,
    pub(crate) sub_col: usize,
    pub(crate) output_col: usize,
    pub(crate) bound: Option<BoundInput>,
}

impl PathSide {
    /// A variable endpoint whose ids live in child column `sub_col`.
    pub fn variable(var: Variable, sub_col: usize) -> Self {
        Self {
            value: SideValue::Var(var),
            sub_col,
            output_col: 0,
            bound: None,
        }
    }

    /// A fixed-id endpoint whose ids live in child column `sub_col`.
    pub fn fixed(id: Id, sub_col: usize) -> Self {
        Self {
            value: SideValue::Fixed(id),
            sub_col,
            output_col: 0,
            bound: None,
        }
    }

    /// The endpoint's value.
    pub fn value(&self) -> &SideValue {
        &self.value
    }

    /// The child-table column carrying this endpoint's ids.
    pub fn sub_col(&self) -> usize {
        self.sub_col
    }

    /// The output-table column this endpoint is written to (0 or 1).
    pub fn output_col(&self) -> usize {
        self.output_col
    }

    /// The bound input, when the planner has restricted this side.
    pub fn bound(&self) -> Option<&BoundInput> {
        self.bound.as_ref()
    }

    /// True when the endpoint is a variable (bound or not).
    pub fn is_variable(&self) -> bool {
        matches!(self.value, SideValue::Var(_))
    }

    /// True when the endpoint is a fixed id.
    pub fn is_fixed(&self) -> bool {
        matches!(self.value, SideValue::Fixed(_))
    }

    /// True when the endpoint is a variable bound to a sub-result.
    pub fn is_bound_variable(&self) -> bool {
        self.bound.is_some()
    }

    /// The fixed id, when the endpoint is one.
    pub fn fixed_id(&self) -> Option<Id> {
        match self.value {
            SideValue::Fixed(id) => Some(id),
            SideValue::Var(_) => None,
        }
    }

    /// The variable, when the endpoint is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.value {
            SideValue::Var(v) => Some(v),
            SideValue::Fixed(_) => None,
        }
    }

    /// True when the bound input declares its result sorted with the join
    /// column as primary key.
    pub fn is_sorted_on_join_col(&self) -> bool {
        let Some(bound) = &self.bound else {
            return false;
        };
        let sorted_on = bound.tree.result_sorted_on();
        sorted_on.first() == Some(&bound.join_col)
    }

    /// This side's contribution to the operator cache key.
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        if let SideValue::Fixed(id) = &self.value {
            let _ = write!(key, "Id: {id}, ");
        }
        let _ = write!(key, "subCol: {} to {}", self.sub_col, self.output_col);
        if let Some(bound) = &self.bound {
            let _ = write!(
                key,
                ", bound: ( {} ) join col {}",
                bound.tree.cache_key(),
                bound.join_col
            );
        }
        key
    }
}

impl std::fmt::Debug for PathSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathSide")
            .field("value", &self.value)
            .field("sub_col", &self.sub_col)
            .field("output_col", &self.output_col)
            .field("bound", &self.bound.as_ref().map(|b| b.join_col))
            .finish()
    }
}
