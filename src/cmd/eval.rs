use super::load_model;
use crate::reports;
use clap::Args;
use likeligrid::config::{parse_list, ModelParams};
use likeligrid::error::{LgResult, LikeligridError};
use likeligrid::model::LikelihoodModel;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    /// Dataset JSON, optionally gzip-compressed
    pub infile: PathBuf,

    #[command(flatten)]
    pub model: ModelParams,

    /// Comma-separated coefficients, one per column name
    #[arg(short, long)]
    pub theta: String,

    /// Also print the normalizing constants D[s]
    #[arg(long, default_value_t = false)]
    pub denominators: bool,
}

pub fn run(args: EvalArgs) -> LgResult<()> {
    let model = load_model(&args.infile, &args.model)?;
    let theta: Vec<f64> = parse_list(&args.theta, "theta")?;
    if theta.len() != model.dimensions() {
        return Err(LikeligridError::Config(format!(
            "--theta has {} values, columns are {}",
            theta.len(),
            model.names().join(",")
        )));
    }

    let loglik = model.loglik(&theta)?;
    reports::print_evaluation(model.names(), &theta, loglik);
    if args.denominators {
        reports::print_denominators(&model.denominators(&theta)?, model.cohort().histogram());
    }
    println!("loglik\t{}", loglik);
    Ok(())
}
