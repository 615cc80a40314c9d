//! # Quiver DB Query
//!
//! Query operators for Quiver DB.
//!
//! This crate provides:
//! - `Operation` trait and `OperatorTree`: planner-facing estimates plus
//!   evaluate-at-most-once materialization
//! - `TransitivePath`: the property path operator `?s <p>{m,n} ?o`, with a
//!   hash-map and a binary-search hull strategy, side binding, and
//!   memory-budgeted, cancellable traversal
//! - `SortOperation` / `create_sorted_tree`: sort-order enforcement used by
//!   the binary-search strategy and bound-side inputs
//! - `ValuesOperation`: constant relations for inline solutions and tests
//!
//! ## Quick Start
//!
//! Build a child tree supplying the base edges (two columns: source,
//! target), wrap it in a `TransitivePath` with two `PathSide`s and a length
//! interval, and call `compute_result` with an `ExecutionContext`.

pub mod context;
pub mod edge_store;
pub mod error;
pub mod operation;
pub mod path_side;
pub mod result;
pub mod sort;
pub mod transitive_path;
pub mod values;
pub mod variable;

pub use context::ExecutionContext;
pub use edge_store::{BinSearchEdges, EdgeStore, HashEdges};
pub use error::{QueryError, Result};
pub use operation::{Operation, OperatorTree};
pub use path_side::{BoundInput, PathSide, SideValue};
pub use result::ResultTable;
pub use sort::{create_sorted_tree, SortOperation};
pub use transitive_path::{
    PathRuntimeStats, PathRuntimeTally, PathStrategy, TransitivePath,
    FIXED_ENDPOINT_SIZE_ESTIMATE, UNBOUNDED, UNBOUND_PAIR_BLOWUP,
};
pub use values::ValuesOperation;
pub use variable::{Variable, VariableColumns};
