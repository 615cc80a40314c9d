//! Edge stores answering `successors(id)` over the base relation
//!
//! Two realizations of the same adjacency contract:
//!
//! - [`HashEdges`] builds a hash map from source id to its target set with a
//!   single scan of the child table. Works on any input; every insertion is
//!   charged to the memory budget.
//! - [`BinSearchEdges`] borrows the child's source and target columns and
//!   answers `successors` with two binary searches plus a contiguous slice.
//!   Requires the child sorted primary-by-source, secondary-by-target; no
//!   per-node allocation.
//!
//! The hull traversal is generic over [`EdgeStore`], so `successors` inlines
//! in both cases.

use crate::error::Result;
use hashbrown::{HashMap, HashSet};
use quiver_db_core::{CancellationHandle, Id, MemoryBudget};

/// Approximate footprint of one id entry in a hash container, including
/// bucket overhead. Used for budget accounting, not exact bookkeeping.
pub(crate) const ID_ENTRY_BYTES: usize = 2 * std::mem::size_of::<Id>();

/// Adjacency view over the base relation.
pub trait EdgeStore {
    /// The successor ids of `node`. Iteration order is unspecified and
    /// entries may repeat when the base relation holds duplicate rows;
    /// consumers rely on set semantics only.
    fn successors(&self, node: Id) -> impl Iterator<Item = Id> + '_;
}

/// Hash adjacency map from source id to target-id set.
pub struct HashEdges {
    map: HashMap<Id, HashSet<Id>>,
}

impl HashEdges {
    /// Build the map from parallel source/target columns.
    ///
    /// Checks cancellation on every row and charges each distinct edge to
    /// the memory budget.
    pub fn build(
        sources: &[Id],
        targets: &[Id],
        budget: &MemoryBudget,
        cancellation: &CancellationHandle,
    ) -> Result<Self> {
        debug_assert_eq!(sources.len(), targets.len());
        let mut map: HashMap<Id, HashSet<Id>> = HashMap::new();
        for (&source, &target) in sources.iter().zip(targets) {
            cancellation.check()?;
            if !map.contains_key(&source) {
                budget.try_reserve(ID_ENTRY_BYTES)?;
            }
            let set = map.entry(source).or_default();
            if !set.contains(&target) {
                budget.try_reserve(ID_ENTRY_BYTES)?;
                set.insert(target);
            }
        }
        Ok(Self { map })
    }

    /// Number of distinct source nodes.
    pub fn num_sources(&self) -> usize {
        self.map.len()
    }
}

impl EdgeStore for HashEdges {
    fn successors(&self, node: Id) -> impl Iterator<Item = Id> + '_ {
        self.map.get(&node).into_iter().flatten().copied()
    }
}

/// Binary-searching adjacency view over two sorted parallel columns.
pub struct BinSearchEdges<'a> {
    sources: &'a [Id],
    targets: &'a [Id],
}

impl<'a> BinSearchEdges<'a> {
    /// Wrap the child's source and target columns.
    ///
    /// The rows must be sorted primary-by-source, secondary-by-target; the
    /// planner enforces this with a sort rewrite. Debug builds verify it.
    pub fn new(sources: &'a [Id], targets: &'a [Id]) -> Self {
        debug_assert_eq!(sources.len(), targets.len());
        debug_assert!(
            sources
                .iter()
                .zip(targets)
                .zip(sources.iter().skip(1).zip(targets.iter().skip(1)))
                .all(|(a, b)| a <= b),
            "input rows must be sorted by (source, target)"
        );
        Self { sources, targets }
    }
}

impl EdgeStore for BinSearchEdges<'_> {
    fn successors(&self, node: Id) -> impl Iterator<Item = Id> + '_ {
        let lo = self.sources.partition_point(|&s| s < node);
        let hi = self.sources.partition_point(|&s| s <= node);
        self.targets[lo..hi].iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> Id {
        Id::new(n)
    }

    fn successors_sorted<E: EdgeStore>(edges: &E, node: u64) -> Vec<u64> {
        let mut out: Vec<u64> = edges.successors(id(node)).map(|i| i.bits()).collect();
        out.sort_unstable();
        out
    }

    fn columns(pairs: &[(u64, u64)]) -> (Vec<Id>, Vec<Id>) {
        (
            pairs.iter().map(|&(s, _)| id(s)).collect(),
            pairs.iter().map(|&(_, t)| id(t)).collect(),
        )
    }

    #[test]
    fn test_hash_edges_successors() {
        let (sources, targets) = columns(&[(1, 2), (1, 3), (2, 3), (1, 2)]);
        let edges = HashEdges::build(
            &sources,
            &targets,
            &MemoryBudget::unlimited(),
            &CancellationHandle::new(),
        )
        .unwrap();

        assert_eq!(edges.num_sources(), 2);
        assert_eq!(successors_sorted(&edges, 1), vec![2, 3]);
        assert_eq!(successors_sorted(&edges, 2), vec![3]);
        assert_eq!(successors_sorted(&edges, 9), Vec::<u64>::new());
    }

    #[test]
    fn test_bin_search_edges_successors() {
        let (sources, targets) = columns(&[(1, 2), (1, 3), (2, 3), (4, 1)]);
        let edges = BinSearchEdges::new(&sources, &targets);

        assert_eq!(successors_sorted(&edges, 1), vec![2, 3]);
        assert_eq!(successors_sorted(&edges, 2), vec![3]);
        assert_eq!(successors_sorted(&edges, 3), Vec::<u64>::new());
        assert_eq!(successors_sorted(&edges, 4), vec![1]);
    }

    #[test]
    fn test_hash_edges_respect_budget() {
        let (sources, targets) = columns(&[(1, 2), (2, 3), (3, 4), (4, 5)]);
        // Too small for four edges plus their source entries.
        let budget = MemoryBudget::limited(3 * ID_ENTRY_BYTES);
        let err = HashEdges::build(&sources, &targets, &budget, &CancellationHandle::new());
        assert!(err.is_err());
    }

    #[test]
    fn test_hash_edges_respect_cancellation() {
        let (sources, targets) = columns(&[(1, 2)]);
        let handle = CancellationHandle::new();
        handle.cancel();
        let err = HashEdges::build(&sources, &targets, &MemoryBudget::unlimited(), &handle);
        assert!(err.is_err());
    }
}
