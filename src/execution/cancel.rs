//! Cooperative cancellation (§5 "Concurrency & Resource Model").
//!
//! No hidden threads and no extra async runtime primitives are needed for
//! cooperative cancellation: a token is just a shared flag, checked at
//! every suspension point the execution layer passes through (cursor
//! pulls, transaction begin/commit/rollback). Checking happens on the
//! caller's own task, so the driver never has to wake anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloned cancellation flag threaded through the compiler (no
/// I/O there, so it is inert until execution), the execution layer, and
/// the driver.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_latches() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
