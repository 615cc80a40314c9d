//! Cooperative cancellation for long-running evaluations.
//!
//! A `CancellationHandle` is shared between the driver of a query and the
//! operators evaluating it. Operators consult the handle at loop boundaries
//! (every DFS stack pop, every build iteration) and abort with a
//! [`CancelledError`] once it has been signalled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// The evaluation was cancelled from the outside.
#[derive(Debug, Clone, Error)]
#[error("query evaluation was cancelled")]
pub struct CancelledError;

/// Cheap-clone cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    /// A fresh, unsignalled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every holder of this handle.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been signalled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Error out if cancellation has been signalled.
    #[inline]
    pub fn check(&self) -> Result<(), CancelledError> {
        if self.is_cancelled() {
            Err(CancelledError)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsignalled_passes() {
        let handle = CancellationHandle::new();
        assert!(!handle.is_cancelled());
        assert!(handle.check().is_ok());
    }

    #[test]
    fn test_signal_is_shared() {
        let handle = CancellationHandle::new();
        let clone = handle.clone();
        handle.cancel();
        assert!(clone.is_cancelled());
        assert!(clone.check().is_err());
    }
}
