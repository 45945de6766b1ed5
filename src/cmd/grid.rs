use super::{load_model, LogProgress};
use crate::reports;
use clap::Args;
use likeligrid::cancel::CancelToken;
use likeligrid::config::{GridParams, ModelParams};
use likeligrid::error::LgResult;
use likeligrid::model::LikelihoodModel;
use likeligrid::search::{GridOptions, GridSearch, SearchOutcome};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Dataset JSON, optionally gzip-compressed
    pub infile: PathBuf,

    #[command(flatten)]
    pub model: ModelParams,

    #[command(flatten)]
    pub grid: GridParams,

    /// Rows of the final table to print
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub fn run(args: GridArgs, jobs: usize, cancel: &CancelToken) -> LgResult<SearchOutcome> {
    let model = load_model(&args.infile, &args.model)?;
    let options = GridOptions::from_params(&args.grid, jobs)?;
    info!(
        "🔥 Grid search: {} stages, {} dimensions, {} worker(s)",
        options.stages.len(),
        model.dimensions(),
        jobs.max(1)
    );

    let search = GridSearch::new(&model, options)?;
    let report = search.run(cancel, LogProgress)?;

    reports::print_stage_summary(&report.stages);
    reports::print_results("GRID", model.names(), &report.results, args.top);
    if report.outcome == SearchOutcome::Completed {
        reports::print_axes(model.names(), &report.next_axes);
    }
    info!("{} evaluations this run", report.evaluations);
    Ok(report.outcome)
}
