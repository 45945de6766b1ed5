pub mod bench;
pub mod climb;
pub mod eval;
pub mod grid;

use likeligrid::config::ModelParams;
use likeligrid::error::LgResult;
use likeligrid::model::GenotypeModel;
use likeligrid::search::{Progress, ProgressCallback};
use std::path::Path;
use tracing::info;

pub fn load_model(infile: &Path, params: &ModelParams) -> LgResult<GenotypeModel> {
    GenotypeModel::load_from_file(infile, params)
}

/// Logs every snapshot and never asks to stop; SIGINT goes through the
/// cancel token instead.
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&self, p: &Progress) -> bool {
        if p.max_count > 0 {
            info!(
                "Stage {} | {:>7}/{:<7} | best {:.6} | {} evals",
                p.stage, p.offset, p.max_count, p.best_loglik, p.evaluations
            );
        } else {
            info!(
                "History {:>7} | current {:.6} | {} evals",
                p.offset, p.best_loglik, p.evaluations
            );
        }
        true
    }
}
