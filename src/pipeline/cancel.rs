//! Cooperative cancellation
//!
//! A run checks its token at every stage boundary. Stages themselves are
//! never interrupted.

use crate::errors::{ClusteringError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next stage boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` if cancellation was requested before `stage`
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(ClusteringError::cancelled(stage))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check("tokenize").is_ok());

        clone.cancel();
        assert!(token.is_cancelled());
        let err = token.check("merge").unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err, ClusteringError::cancelled("merge"));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
