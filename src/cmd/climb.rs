use super::{load_model, LogProgress};
use crate::reports;
use clap::Args;
use likeligrid::cancel::CancelToken;
use likeligrid::config::{ClimbParams, ModelParams};
use likeligrid::error::LgResult;
use likeligrid::model::LikelihoodModel;
use likeligrid::search::{ClimbOptions, HillClimb, SearchOutcome};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ClimbArgs {
    /// Dataset JSON, optionally gzip-compressed
    pub infile: PathBuf,

    #[command(flatten)]
    pub model: ModelParams,

    #[command(flatten)]
    pub climb: ClimbParams,

    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub fn run(args: ClimbArgs, jobs: usize, cancel: &CancelToken) -> LgResult<SearchOutcome> {
    let model = load_model(&args.infile, &args.model)?;
    let options = ClimbOptions::from_params(&args.climb, jobs);
    info!(
        "⛰️  Hill climb: step {}, start {}, output {}",
        options.step,
        options.initial,
        args.climb.output.display()
    );

    let report = HillClimb::new(&model, options)?.run(cancel, LogProgress)?;

    reports::print_results("CLIMB", model.names(), &report.history, args.top);
    info!(
        "{} moves, {} evaluations this run, {} points in history",
        report.moves,
        report.evaluations,
        report.history.len()
    );
    Ok(report.outcome)
}
