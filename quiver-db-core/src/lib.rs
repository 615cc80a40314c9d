//! # Quiver DB Core
//!
//! Runtime-agnostic primitives for Quiver DB query execution.
//!
//! This crate provides:
//! - `Id`: opaque 64-bit term identifier with bitwise equality and ordering
//! - `IdTable`: column-major relation of ids
//! - `MemoryBudget`: per-query allocation budget that turns OOM into a
//!   recoverable error
//! - `CancellationHandle`: cooperative cancellation for long traversals
//! - `LocalVocab`: side-channel mapping for ids of non-indexed literals
//!
//! ## Design Principles
//!
//! 1. **Runtime-agnostic**: no async runtime, no forced I/O seam
//! 2. **Cheap handles**: budget and cancellation are `Arc`-backed and cost a
//!    null check (or one atomic load) when consulted on hot paths
//! 3. **Recoverable resource errors**: breaching the budget or observing a
//!    cancellation yields a typed error, never a crash

pub mod budget;
pub mod cancel;
pub mod id;
pub mod id_table;
pub mod local_vocab;

pub use budget::{MemoryBudget, MemoryExceededError};
pub use cancel::{CancellationHandle, CancelledError};
pub use id::Id;
pub use id_table::IdTable;
pub use local_vocab::LocalVocab;
