//! Cooperative cancellation for long-running pricing and calibration work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that long-running loops poll between units of work.
///
/// Cloning is cheap and every clone observes the same flag, so a caller can
/// keep one handle and hand another to a pricer or calibrator running on a
/// different thread.
///
/// ```
/// use pricer_core::types::CancellationToken;
///
/// let token = CancellationToken::new();
/// let worker = token.clone();
/// assert!(!worker.is_cancelled());
///
/// token.cancel();
/// assert!(worker.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the "running" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
