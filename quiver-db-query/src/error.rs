//! Error types for query execution

use quiver_db_core::{CancelledError, MemoryExceededError};
use thiserror::Error;

/// Query execution errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// Evaluating the empty path with two unbound endpoints is unsupported
    #[error(
        "this query might have to evaluate the empty path over two unbound \
         variables, which is not supported"
    )]
    EmptyPathUnsupported,

    /// Per-query memory budget exceeded
    #[error(transparent)]
    MemoryLimit(#[from] MemoryExceededError),

    /// Evaluation was cancelled from the outside
    #[error(transparent)]
    Cancelled(#[from] CancelledError),

    /// Invalid query or operator configuration
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
