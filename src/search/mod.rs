pub mod climb;
pub mod grid;
pub mod lattice;
pub mod results;

pub use self::climb::{ClimbOptions, ClimbReport, HillClimb};
pub use self::grid::{GridOptions, GridReport, GridSearch, Stage};
pub use self::results::{ResultTable, ScoredPoint, ThetaKey};

use crate::error::{LgResult, LikeligridError};
use strum_macros::Display;

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SearchOutcome {
    Completed,
    Interrupted,
}

/// Snapshot handed to a [`ProgressCallback`].
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Grid stage index; zero for the local search.
    pub stage: usize,
    /// Points done in this stage, or points in the climb history.
    pub offset: usize,
    /// Points in this stage; zero for the local search.
    pub max_count: usize,
    pub evaluations: usize,
    pub best_loglik: f64,
}

/// Receives updates during a search.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, progress: &Progress) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(&Progress) -> bool + Send + Sync,
{
    fn on_progress(&self, progress: &Progress) -> bool {
        self(progress)
    }
}

pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_progress(&self, _progress: &Progress) -> bool {
        true
    }
}

/// A dedicated pool when more than one worker is requested.
pub(crate) fn build_pool(concurrency: usize) -> LgResult<Option<rayon::ThreadPool>> {
    if concurrency <= 1 {
        return Ok(None);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build()
        .map(Some)
        .map_err(|e| LikeligridError::Config(format!("Cannot start {} workers: {}", concurrency, e)))
}
