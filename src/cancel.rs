use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative interrupt flag shared between a search driver and whatever
/// may want to stop it.
///
/// Drivers poll it between evaluations; it never preempts an evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// The shared flag, for handing to code that cannot hold a token
    /// (e.g. a signal handler).
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}
