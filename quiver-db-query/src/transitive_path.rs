//! Transitive path operator
//!
//! Evaluates property paths of the form `?s <p>{m,n} ?o`: given a child
//! relation holding the base edges of one predicate (a two-column table of
//! source/target ids), produces every node pair connected by an edge
//! composition whose length lies within `[min_dist, max_dist]`.
//!
//! The operator plugs into cost-based planning (size/cost/sortedness
//! estimates, deterministic cache key, child enumeration), accepts
//! bound-side inputs that restrict the traversal's start set, and supports
//! two hull strategies with identical set semantics:
//!
//! - [`PathStrategy::HashMap`] builds a hash adjacency map (any input)
//! - [`PathStrategy::BinSearch`] binary-searches the child's sorted columns
//!   (the constructor inserts the sort rewrite on the traversal direction)
//!
//! Side binding is a functional rewrite: [`TransitivePath::bind_left_side`]
//! and [`TransitivePath::bind_right_side`] return a fresh operator sharing
//! the child subtrees, with the bound input's remaining columns appended to
//! the output schema.

use crate::context::ExecutionContext;
use crate::edge_store::{BinSearchEdges, EdgeStore, HashEdges, ID_ENTRY_BYTES};
use crate::error::{QueryError, Result};
use crate::operation::{Operation, OperatorTree};
use crate::path_side::{BoundInput, PathSide, SideValue};
use crate::result::ResultTable;
use crate::sort::create_sorted_tree;
use crate::variable::VariableColumns;
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use quiver_db_core::{CancellationHandle, Id, IdTable, LocalVocab, MemoryBudget};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Unbounded maximum path length, as in the `+` and `*` operators.
pub const UNBOUNDED: usize = usize::MAX;

/// Size estimate used when either endpoint is a fixed id.
///
/// Usually an overestimate, but it keeps the planner from scheduling plans
/// that first build large intermediate results and only then intersect them
/// with a selective path. Tunable; no claim of optimality.
pub const FIXED_ENDPOINT_SIZE_ESTIMATE: u64 = 1000;

/// Assumed worst-case blowup of the hull relative to the base relation when
/// both endpoints are unbound variables. Calibrated against the largest
/// blowups observed on public knowledge graphs.
pub const UNBOUND_PAIR_BLOWUP: u64 = 10_000;

/// Hull computation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStrategy {
    /// Hash adjacency map built from the child table. Works on any input.
    HashMap,
    /// Binary search over the child's sorted (source, target) columns.
    BinSearch,
}

/// Map from start node to the set of targets reachable within the interval.
type Hull = HashMap<Id, HashSet<Id>>;

/// Per-evaluation phase timings, readable after `compute_result`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathRuntimeStats {
    /// Edge-store build plus start-list construction.
    pub initialization: Duration,
    /// The hull traversal itself.
    pub hull: Duration,
    /// Result-table materialization.
    pub fill: Duration,
}

impl PathRuntimeStats {
    /// Serializable tally with times formatted like `"12.34ms"`.
    pub fn tally(&self) -> PathRuntimeTally {
        PathRuntimeTally {
            initialization: format_time_ms(self.initialization),
            hull: format_time_ms(self.hull),
            fill: format_time_ms(self.fill),
        }
    }
}

/// Serializable runtime tally of one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct PathRuntimeTally {
    pub initialization: String,
    pub hull: String,
    pub fill: String,
}

fn format_time_ms(duration: Duration) -> String {
    format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
}

/// The transitive path operator.
pub struct TransitivePath {
    subtree: Arc<OperatorTree>,
    left: PathSide,
    right: PathSide,
    min_dist: usize,
    max_dist: usize,
    strategy: PathStrategy,
    result_width: usize,
    variables: VariableColumns,
    stats: Mutex<PathRuntimeStats>,
}

impl TransitivePath {
    /// Create an operator using the binary-search hull strategy.
    ///
    /// The child is wrapped in a sort rewrite on (start column, target
    /// column) of the traversal direction unless it already declares that
    /// order.
    pub fn bin_search(
        subtree: Arc<OperatorTree>,
        left: PathSide,
        right: PathSide,
        min_dist: usize,
        max_dist: usize,
    ) -> Result<Self> {
        Self::new(subtree, left, right, min_dist, max_dist, PathStrategy::BinSearch)
    }

    /// Create an operator using the hash adjacency map strategy.
    pub fn hash_map(
        subtree: Arc<OperatorTree>,
        left: PathSide,
        right: PathSide,
        min_dist: usize,
        max_dist: usize,
    ) -> Result<Self> {
        Self::new(subtree, left, right, min_dist, max_dist, PathStrategy::HashMap)
    }

    /// Create an operator with an explicit strategy.
    ///
    /// Output columns are assigned here: the left endpoint writes column 0,
    /// the right endpoint column 1, and the carry-over columns of a bound
    /// side follow in that side's input order (skipping its join column).
    pub fn new(
        subtree: Arc<OperatorTree>,
        mut left: PathSide,
        mut right: PathSide,
        min_dist: usize,
        max_dist: usize,
        strategy: PathStrategy,
    ) -> Result<Self> {
        if min_dist > max_dist {
            return Err(QueryError::InvalidQuery(format!(
                "path length interval is empty: min {min_dist} > max {max_dist}"
            )));
        }
        if let (Some(l), Some(r)) = (left.as_variable(), right.as_variable()) {
            if l == r {
                return Err(QueryError::InvalidQuery(format!(
                    "the two endpoints of a transitive path must be distinct variables, got {l} twice"
                )));
            }
        }
        if left.is_bound_variable() && right.is_bound_variable() {
            return Err(QueryError::InvalidQuery(
                "at most one side of a transitive path can be bound".to_string(),
            ));
        }

        left.output_col = 0;
        right.output_col = 1;

        let mut variables = VariableColumns::new();
        if let Some(var) = left.as_variable() {
            variables.insert(var.clone(), 0);
        }
        if let Some(var) = right.as_variable() {
            variables.insert(var.clone(), 1);
        }

        let mut result_width = 2;
        for side in [&left, &right] {
            let Some(bound) = &side.bound else { continue };
            for (var, col) in bound.tree.variable_columns().iter() {
                if col == bound.join_col {
                    continue;
                }
                // Carry-over columns keep their relative input order and are
                // packed behind the two endpoint columns.
                let output = if col > bound.join_col { col + 1 } else { col + 2 };
                variables.insert(var.clone(), output);
                result_width += 1;
            }
        }

        let subtree = match strategy {
            PathStrategy::BinSearch => {
                let (start, target) = decide_direction_of(&left, &right);
                create_sorted_tree(subtree, &[start.sub_col, target.sub_col])
            }
            PathStrategy::HashMap => subtree,
        };

        Ok(Self {
            subtree,
            left,
            right,
            min_dist,
            max_dist,
            strategy,
            result_width,
            variables,
            stats: Mutex::new(PathRuntimeStats::default()),
        })
    }

    /// Bind the left side to a sub-result restricting its values.
    ///
    /// Returns a new operator; `self` is unchanged. The bound input is
    /// wrapped in a sort on `join_col` unless already sorted there, and its
    /// non-join variables are appended to the output schema.
    pub fn bind_left_side(&self, tree: Arc<OperatorTree>, join_col: usize) -> Result<Self> {
        self.bind_side(tree, join_col, true)
    }

    /// Bind the right side to a sub-result restricting its values.
    ///
    /// See [`bind_left_side`](Self::bind_left_side).
    pub fn bind_right_side(&self, tree: Arc<OperatorTree>, join_col: usize) -> Result<Self> {
        self.bind_side(tree, join_col, false)
    }

    fn bind_side(&self, tree: Arc<OperatorTree>, join_col: usize, is_left: bool) -> Result<Self> {
        let side = if is_left { &self.left } else { &self.right };
        if !side.is_variable() {
            return Err(QueryError::InvalidQuery(
                "only a variable side of a transitive path can be bound".to_string(),
            ));
        }
        if side.is_bound_variable() {
            return Err(QueryError::InvalidQuery(
                "this side of the transitive path is already bound".to_string(),
            ));
        }
        if join_col >= tree.result_width() {
            return Err(QueryError::InvalidQuery(format!(
                "join column {join_col} out of range for bound input of width {}",
                tree.result_width()
            )));
        }

        let tree = create_sorted_tree(tree, &[join_col]);

        let mut left = self.left.clone();
        let mut right = self.right.clone();
        let bound_side = if is_left { &mut left } else { &mut right };
        bound_side.bound = Some(BoundInput { tree, join_col });

        Self::new(
            Arc::clone(&self.subtree),
            left,
            right,
            self.min_dist,
            self.max_dist,
            self.strategy,
        )
    }

    /// Minimum path length (inclusive).
    pub fn min_dist(&self) -> usize {
        self.min_dist
    }

    /// Maximum path length (inclusive); [`UNBOUNDED`] when open-ended.
    pub fn max_dist(&self) -> usize {
        self.max_dist
    }

    /// The left endpoint.
    pub fn left(&self) -> &PathSide {
        &self.left
    }

    /// The right endpoint.
    pub fn right(&self) -> &PathSide {
        &self.right
    }

    /// The hull strategy in use.
    pub fn strategy(&self) -> PathStrategy {
        self.strategy
    }

    /// The child subtree supplying the base edges.
    pub fn subtree(&self) -> &Arc<OperatorTree> {
        &self.subtree
    }

    /// True when a side is bound or a fixed id restricts the search.
    pub fn is_bound_or_fixed(&self) -> bool {
        self.left.is_bound_variable()
            || self.right.is_bound_variable()
            || self.left.is_fixed()
            || self.right.is_fixed()
    }

    /// Phase timings of the most recent evaluation.
    pub fn runtime_stats(&self) -> PathRuntimeStats {
        *self.stats.lock()
    }

    /// Choose the start and the target side of the traversal.
    ///
    /// The start set dominates traversal cost, so a side with an explicit
    /// restriction is preferred: a bound side first (left before right),
    /// then a fixed right endpoint (searching the relation backwards),
    /// otherwise the left side.
    pub fn decide_direction(&self) -> (&PathSide, &PathSide) {
        decide_direction_of(&self.left, &self.right)
    }

    /// Start-node list for the unbound (or fixed-start) traversal.
    ///
    /// A fixed start contributes itself; an unbound variable start
    /// contributes the child's start column, plus the target column when
    /// length-0 identity paths are in the interval.
    fn start_nodes_unbound(&self, sub: &IdTable, start: &PathSide, target: &PathSide) -> Vec<Id> {
        match start.fixed_id() {
            Some(id) => vec![id],
            None => {
                let mut nodes = sub.column(start.sub_col()).to_vec();
                if self.min_dist == 0 {
                    nodes.extend_from_slice(sub.column(target.sub_col()));
                }
                nodes
            }
        }
    }

    fn compute_unbound(
        &self,
        ctx: &ExecutionContext,
        table: &mut IdTable,
        sub: &IdTable,
        start: &PathSide,
        target: &PathSide,
    ) -> Result<()> {
        let init_timer = Instant::now();
        let nodes = self.start_nodes_unbound(sub, start, target);
        match self.strategy {
            PathStrategy::HashMap => {
                let edges = HashEdges::build(
                    sub.column(start.sub_col()),
                    sub.column(target.sub_col()),
                    &ctx.budget,
                    &ctx.cancellation,
                )?;
                self.traverse_and_fill(ctx, table, &edges, &nodes, start, target, None, init_timer)
            }
            PathStrategy::BinSearch => {
                let edges =
                    BinSearchEdges::new(sub.column(start.sub_col()), sub.column(target.sub_col()));
                self.traverse_and_fill(ctx, table, &edges, &nodes, start, target, None, init_timer)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn compute_bound(
        &self,
        ctx: &ExecutionContext,
        table: &mut IdTable,
        sub: &IdTable,
        start: &PathSide,
        target: &PathSide,
        start_table: &IdTable,
        join_col: usize,
    ) -> Result<()> {
        let init_timer = Instant::now();
        // The bound input's join column in its existing order; duplicates
        // are kept, each input row yields its own output rows.
        let nodes: Vec<Id> = start_table.column(join_col).to_vec();
        match self.strategy {
            PathStrategy::HashMap => {
                let edges = HashEdges::build(
                    sub.column(start.sub_col()),
                    sub.column(target.sub_col()),
                    &ctx.budget,
                    &ctx.cancellation,
                )?;
                self.traverse_and_fill(
                    ctx,
                    table,
                    &edges,
                    &nodes,
                    start,
                    target,
                    Some((start_table, join_col)),
                    init_timer,
                )
            }
            PathStrategy::BinSearch => {
                let edges =
                    BinSearchEdges::new(sub.column(start.sub_col()), sub.column(target.sub_col()));
                self.traverse_and_fill(
                    ctx,
                    table,
                    &edges,
                    &nodes,
                    start,
                    target,
                    Some((start_table, join_col)),
                    init_timer,
                )
            }
        }
    }

    /// Shared tail of both compute paths: hull traversal, table fill, and
    /// phase-timing bookkeeping.
    #[allow(clippy::too_many_arguments)]
    fn traverse_and_fill<E: EdgeStore>(
        &self,
        ctx: &ExecutionContext,
        table: &mut IdTable,
        edges: &E,
        nodes: &[Id],
        start: &PathSide,
        target: &PathSide,
        bound_input: Option<(&IdTable, usize)>,
        init_timer: Instant,
    ) -> Result<()> {
        let initialization = init_timer.elapsed();

        let hull_timer = Instant::now();
        let hull = transitive_hull(
            edges,
            nodes,
            target.fixed_id(),
            self.min_dist,
            self.max_dist,
            &ctx.budget,
            &ctx.cancellation,
        )?;
        let hull_time = hull_timer.elapsed();

        let fill_timer = Instant::now();
        match bound_input {
            Some((start_table, skip_col)) => fill_table_with_hull_bound(
                table,
                &hull,
                nodes,
                start.output_col(),
                target.output_col(),
                start_table,
                skip_col,
                &ctx.budget,
            )?,
            None => fill_table_with_hull(
                table,
                &hull,
                start.output_col(),
                target.output_col(),
                &ctx.budget,
            )?,
        }
        let fill = fill_timer.elapsed();

        *self.stats.lock() = PathRuntimeStats {
            initialization,
            hull: hull_time,
            fill,
        };
        debug!(
            rows = table.num_rows(),
            init_ms = initialization.as_secs_f64() * 1e3,
            hull_ms = hull_time.as_secs_f64() * 1e3,
            fill_ms = fill.as_secs_f64() * 1e3,
            "transitive path computed"
        );
        Ok(())
    }
}

impl Operation for TransitivePath {
    fn descriptor(&self) -> String {
        let mut out = String::from("TransitivePath ");
        if self.min_dist > 1 || self.max_dist < UNBOUNDED {
            if self.max_dist == UNBOUNDED {
                let _ = write!(out, "[{}, inf] ", self.min_dist);
            } else {
                let _ = write!(out, "[{}, {}] ", self.min_dist, self.max_dist);
            }
        }
        match &self.left.value {
            SideValue::Var(var) => {
                let _ = write!(out, "{var}");
            }
            SideValue::Fixed(id) => {
                let _ = write!(out, "{id}");
            }
        }
        out.push(' ');
        match &self.right.value {
            SideValue::Var(var) => {
                let _ = write!(out, "{var}");
            }
            SideValue::Fixed(id) => {
                let _ = write!(out, "{id}");
            }
        }
        out
    }

    fn result_width(&self) -> usize {
        self.result_width
    }

    fn result_sorted_on(&self) -> Vec<usize> {
        if self.left.is_sorted_on_join_col() {
            vec![self.left.output_col]
        } else if self.right.is_sorted_on_join_col() {
            vec![self.right.output_col]
        } else {
            Vec::new()
        }
    }

    fn size_estimate(&self) -> u64 {
        if self.left.is_fixed() || self.right.is_fixed() {
            return FIXED_ENDPOINT_SIZE_ESTIMATE;
        }
        if let Some(bound) = self.left.bound() {
            return bound.tree.size_estimate();
        }
        if let Some(bound) = self.right.bound() {
            return bound.tree.size_estimate();
        }
        if self.left.is_variable() && self.right.is_variable() {
            return self
                .subtree
                .size_estimate()
                .saturating_mul(UNBOUND_PAIR_BLOWUP);
        }
        if self.left.is_variable() {
            let size = self.subtree.size_estimate() as f64;
            let mult = self.subtree.multiplicity(self.left.sub_col()).max(1.0);
            return (size / mult) as u64;
        }
        self.subtree.size_estimate()
    }

    fn cost_estimate(&self) -> u64 {
        // The traversal's cost is assumed proportional to the result size.
        let mut cost = self.size_estimate();
        for child in self.children() {
            cost = cost.saturating_add(child.cost_estimate());
        }
        cost
    }

    fn multiplicity(&self, _col: usize) -> f64 {
        // The multiplicities are not known.
        1.0
    }

    fn known_empty_result(&self) -> bool {
        self.subtree.known_empty_result()
    }

    fn cache_key(&self) -> String {
        let max = if self.max_dist == UNBOUNDED {
            "inf".to_string()
        } else {
            self.max_dist.to_string()
        };
        format!(
            "TRANSITIVE_PATH min {} max {} left ( {} ) right ( {} ) child ( {} )",
            self.min_dist,
            max,
            self.left.cache_key(),
            self.right.cache_key(),
            self.subtree.cache_key()
        )
    }

    fn variable_columns(&self) -> &VariableColumns {
        &self.variables
    }

    fn children(&self) -> Vec<&Arc<OperatorTree>> {
        let mut out = Vec::new();
        if let Some(bound) = &self.left.bound {
            out.push(&bound.tree);
        }
        if let Some(bound) = &self.right.bound {
            out.push(&bound.tree);
        }
        out.push(&self.subtree);
        out
    }

    fn compute_result(&self, ctx: &ExecutionContext) -> Result<ResultTable> {
        if self.min_dist == 0
            && !self.is_bound_or_fixed()
            && self.left.is_variable()
            && self.right.is_variable()
        {
            return Err(QueryError::EmptyPathUnsupported);
        }

        let (start, target) = self.decide_direction();
        let sub_res = self.subtree.result(ctx)?;
        let sub = sub_res.id_table();

        let mut table = IdTable::new(self.result_width);

        if let Some(bound) = start.bound() {
            let side_res = bound.tree.result(ctx)?;
            let join_col = bound.join_col;
            self.compute_bound(ctx, &mut table, sub, start, target, side_res.id_table(), join_col)?;
            let vocab =
                LocalVocab::shared_from_non_empty_of(side_res.local_vocab(), sub_res.local_vocab());
            return Ok(ResultTable::new(table, self.result_sorted_on(), vocab));
        }

        self.compute_unbound(ctx, &mut table, sub, start, target)?;
        Ok(ResultTable::new(
            table,
            self.result_sorted_on(),
            Arc::clone(sub_res.local_vocab()),
        ))
    }
}

fn decide_direction_of<'a>(left: &'a PathSide, right: &'a PathSide) -> (&'a PathSide, &'a PathSide) {
    if left.is_bound_variable() {
        (left, right)
    } else if right.is_bound_variable() {
        (right, left)
    } else if right.is_fixed() {
        // Search the relation backwards towards the fixed right endpoint.
        (right, left)
    } else {
        (left, right)
    }
}

/// Iterative depth-first hull from each unique start node.
///
/// The `marks` set breaks cycles: a node reached at depth >= `min_dist` is
/// marked and never re-expanded for the current start. Nodes reached below
/// `min_dist` stay unmarked, keeping longer rediscoveries inside the
/// interval reachable. A start node already present in the hull is skipped;
/// an earlier start computed its reachable set.
///
/// With a `target` filter only pairs ending at that id enter the hull; the
/// traversal itself is unchanged.
fn transitive_hull<E: EdgeStore>(
    edges: &E,
    start_nodes: &[Id],
    target: Option<Id>,
    min_dist: usize,
    max_dist: usize,
    budget: &MemoryBudget,
    cancellation: &CancellationHandle,
) -> Result<Hull> {
    let mut hull: Hull = HashMap::new();
    let mut marks: FxHashSet<Id> = FxHashSet::default();
    let mut stack: Vec<(Id, usize)> = Vec::new();

    for &start in start_nodes {
        if hull.contains_key(&start) {
            continue;
        }

        budget.release(marks.len() * ID_ENTRY_BYTES);
        marks.clear();
        stack.clear();
        stack.push((start, 0));

        if min_dist == 0 && target.map_or(true, |t| start == t) {
            hull_insert(&mut hull, start, start, budget)?;
        }

        while let Some((node, steps)) = stack.pop() {
            cancellation.check()?;
            if steps > max_dist || marks.contains(&node) {
                continue;
            }
            if steps >= min_dist {
                budget.try_reserve(ID_ENTRY_BYTES)?;
                marks.insert(node);
                if target.map_or(true, |t| node == t) {
                    hull_insert(&mut hull, start, node, budget)?;
                }
            }
            if steps < max_dist {
                for successor in edges.successors(node) {
                    stack.push((successor, steps + 1));
                }
            }
        }
    }

    budget.release(marks.len() * ID_ENTRY_BYTES);
    Ok(hull)
}

fn hull_insert(hull: &mut Hull, start: Id, node: Id, budget: &MemoryBudget) -> Result<()> {
    if !hull.contains_key(&start) {
        budget.try_reserve(ID_ENTRY_BYTES)?;
    }
    let set = hull.entry(start).or_default();
    if !set.contains(&node) {
        budget.try_reserve(ID_ENTRY_BYTES)?;
        set.insert(node);
    }
    Ok(())
}

/// Fill the table from the hull when no side is bound: one row per
/// `(start, reachable)` pair, written at the endpoint output columns.
fn fill_table_with_hull(
    table: &mut IdTable,
    hull: &Hull,
    start_col: usize,
    target_col: usize,
    budget: &MemoryBudget,
) -> Result<()> {
    let row_bytes = table.num_columns() * std::mem::size_of::<Id>();
    for (&node, linked) in hull {
        for &other in linked {
            budget.try_reserve(row_bytes)?;
            let row = table.push_empty_row();
            table.set(row, start_col, node);
            table.set(row, target_col, other);
        }
    }
    Ok(())
}

/// Fill the table from the hull when the start side is bound: iterate the
/// start list in input order, and copy each input row's remaining columns
/// next to every emitted pair. An input node occurring k times contributes
/// k copies of its reachable set.
#[allow(clippy::too_many_arguments)]
fn fill_table_with_hull_bound(
    table: &mut IdTable,
    hull: &Hull,
    nodes: &[Id],
    start_col: usize,
    target_col: usize,
    start_table: &IdTable,
    skip_col: usize,
    budget: &MemoryBudget,
) -> Result<()> {
    let row_bytes = table.num_columns() * std::mem::size_of::<Id>();
    for (input_row, &node) in nodes.iter().enumerate() {
        let Some(linked) = hull.get(&node) else {
            continue;
        };
        for &other in linked {
            budget.try_reserve(row_bytes)?;
            let row = table.push_empty_row();
            table.set(row, start_col, node);
            table.set(row, target_col, other);
            copy_columns(start_table, table, input_row, row, skip_col);
        }
    }
    Ok(())
}

/// Copy one input row's columns into the carry-over columns of an output
/// row, skipping the join column.
fn copy_columns(
    input: &IdTable,
    output: &mut IdTable,
    input_row: usize,
    output_row: usize,
    skip_col: usize,
) {
    let mut out_col = 2;
    for in_col in 0..input.num_columns() {
        if in_col == skip_col {
            continue;
        }
        if out_col >= output.num_columns() {
            break;
        }
        output.set(output_row, out_col, input.at(input_row, in_col));
        out_col += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::ValuesOperation;
    use crate::variable::Variable;

    fn id(n: u64) -> Id {
        Id::new(n)
    }

    fn edges_of(pairs: &[(u64, u64)]) -> HashEdges {
        let sources: Vec<Id> = pairs.iter().map(|&(s, _)| id(s)).collect();
        let targets: Vec<Id> = pairs.iter().map(|&(_, t)| id(t)).collect();
        HashEdges::build(
            &sources,
            &targets,
            &MemoryBudget::unlimited(),
            &CancellationHandle::new(),
        )
        .unwrap()
    }

    fn hull_pairs(hull: &Hull) -> Vec<(u64, u64)> {
        let mut out: Vec<(u64, u64)> = hull
            .iter()
            .flat_map(|(&s, set)| set.iter().map(move |&t| (s.bits(), t.bits())))
            .collect();
        out.sort_unstable();
        out
    }

    fn run_hull(
        pairs: &[(u64, u64)],
        starts: &[u64],
        target: Option<u64>,
        min: usize,
        max: usize,
    ) -> Vec<(u64, u64)> {
        let edges = edges_of(pairs);
        let starts: Vec<Id> = starts.iter().map(|&n| id(n)).collect();
        let hull = transitive_hull(
            &edges,
            &starts,
            target.map(id),
            min,
            max,
            &MemoryBudget::unlimited(),
            &CancellationHandle::new(),
        )
        .unwrap();
        hull_pairs(&hull)
    }

    #[test]
    fn test_hull_chain_interval() {
        let pairs = run_hull(&[(1, 2), (2, 3), (3, 4)], &[1, 2, 3], None, 1, 2);
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3), (2, 4), (3, 4)]);
    }

    #[test]
    fn test_hull_lower_bound_keeps_longer_rediscoveries() {
        // 1 -> 2 -> 3 and a shortcut 1 -> 3. With min 2 the pair (1, 3)
        // must still be found through the longer walk even though the
        // shortcut reaches 3 below the minimum first.
        let pairs = run_hull(&[(1, 3), (1, 2), (2, 3)], &[1], None, 2, 2);
        assert_eq!(pairs, vec![(1, 3)]);
    }

    #[test]
    fn test_hull_cycle_terminates() {
        let pairs = run_hull(&[(1, 2), (2, 3), (3, 1)], &[1, 2, 3], None, 1, UNBOUNDED);
        assert_eq!(
            pairs,
            vec![
                (1, 1),
                (1, 2),
                (1, 3),
                (2, 1),
                (2, 2),
                (2, 3),
                (3, 1),
                (3, 2),
                (3, 3),
            ]
        );
    }

    #[test]
    fn test_hull_target_filter() {
        let pairs = run_hull(&[(1, 2), (2, 3), (3, 4)], &[1, 2, 3], None, 1, UNBOUNDED);
        assert!(pairs.contains(&(1, 4)));

        let filtered = run_hull(&[(1, 2), (2, 3), (3, 4)], &[1, 2, 3], Some(4), 1, UNBOUNDED);
        assert_eq!(filtered, vec![(1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn test_hull_zero_min_identity() {
        let pairs = run_hull(&[(1, 2)], &[1, 2], None, 0, UNBOUNDED);
        assert_eq!(pairs, vec![(1, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_hull_memoizes_repeated_starts() {
        let pairs = run_hull(&[(1, 2)], &[1, 1, 1], None, 1, UNBOUNDED);
        assert_eq!(pairs, vec![(1, 2)]);
    }

    fn chain_child() -> Arc<OperatorTree> {
        let table = IdTable::from_rows(
            2,
            &[
                vec![id(1), id(2)],
                vec![id(2), id(3)],
                vec![id(3), id(4)],
            ],
        );
        OperatorTree::new(
            ValuesOperation::new(table, vec![Variable::new("?s"), Variable::new("?o")])
                .with_sorted_on(vec![0, 1]),
        )
    }

    fn var_side(name: &str, sub_col: usize) -> PathSide {
        PathSide::variable(Variable::new(name), sub_col)
    }

    #[test]
    fn test_direction_prefers_bound_then_fixed_right() {
        let op = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?y", 1),
            1,
            UNBOUNDED,
        )
        .unwrap();
        let (start, _) = op.decide_direction();
        assert_eq!(start.output_col(), 0);

        let fixed_right = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            PathSide::fixed(id(4), 1),
            1,
            UNBOUNDED,
        )
        .unwrap();
        let (start, target) = fixed_right.decide_direction();
        assert_eq!(start.output_col(), 1);
        assert_eq!(target.output_col(), 0);

        let bound_tree = OperatorTree::new(ValuesOperation::new(
            IdTable::from_rows(1, &[vec![id(1)]]),
            vec![Variable::new("?x")],
        ));
        let bound = op.bind_left_side(bound_tree, 0).unwrap();
        let (start, _) = bound.decide_direction();
        assert!(start.is_bound_variable());
    }

    #[test]
    fn test_constructor_rejects_bad_configurations() {
        let same_var = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?x", 1),
            1,
            UNBOUNDED,
        );
        assert!(same_var.is_err());

        let empty_interval = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?y", 1),
            3,
            2,
        );
        assert!(empty_interval.is_err());
    }

    #[test]
    fn test_bind_rejects_fixed_and_rebinding() {
        let op = TransitivePath::hash_map(
            chain_child(),
            PathSide::fixed(id(1), 0),
            var_side("?y", 1),
            1,
            UNBOUNDED,
        )
        .unwrap();
        let values = OperatorTree::new(ValuesOperation::new(
            IdTable::from_rows(1, &[vec![id(1)]]),
            vec![Variable::new("?z")],
        ));
        assert!(op.bind_left_side(Arc::clone(&values), 0).is_err());

        let op = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?y", 1),
            1,
            UNBOUNDED,
        )
        .unwrap();
        let bound = op.bind_left_side(Arc::clone(&values), 0).unwrap();
        assert!(bound.bind_left_side(values, 0).is_err());
    }

    #[test]
    fn test_descriptor_elides_default_interval() {
        let plain = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?y", 1),
            1,
            UNBOUNDED,
        )
        .unwrap();
        assert_eq!(plain.descriptor(), "TransitivePath ?x ?y");

        let bounded = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?y", 1),
            2,
            3,
        )
        .unwrap();
        assert_eq!(bounded.descriptor(), "TransitivePath [2, 3] ?x ?y");
    }

    #[test]
    fn test_runtime_stats_tally_format() {
        let op = TransitivePath::hash_map(
            chain_child(),
            var_side("?x", 0),
            var_side("?y", 1),
            1,
            2,
        )
        .unwrap();
        op.compute_result(&ExecutionContext::new()).unwrap();
        let tally = op.runtime_stats().tally();
        assert!(tally.initialization.ends_with("ms"));
        assert!(tally.hull.ends_with("ms"));
        assert!(tally.fill.ends_with("ms"));
    }
}
