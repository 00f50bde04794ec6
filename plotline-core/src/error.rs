//! Cancellation support for evaluation passes.
//!
//! The engine reports malformed input through diagnostics, never through
//! `Err`. The only failure that propagates as an error is cooperative
//! cancellation: a superseded pass stops at its next check point and
//! unwinds with [`Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// A pass was cancelled before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("evaluation cancelled")]
pub struct Cancelled;

/// Shared flag checked at every suspension point of a pass.
///
/// Cloning the token shares the flag. Tokens are created per request and
/// cancelled when a newer request supersedes the pass.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Bail out with [`Cancelled`] when the flag is set.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
