use super::load_model;
use clap::Args;
use likeligrid::config::ModelParams;
use likeligrid::consts::DEFAULT_CLIMB_INITIAL;
use likeligrid::error::LgResult;
use likeligrid::model::LikelihoodModel;
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Dataset JSON, optionally gzip-compressed
    pub infile: PathBuf,

    #[command(flatten)]
    pub model: ModelParams,

    /// Number of timed evaluations
    #[arg(short = 'n', long, default_value_t = 10)]
    pub repeats: usize,
}

pub fn run(args: BenchArgs) -> LgResult<()> {
    let model = load_model(&args.infile, &args.model)?;
    let theta = vec![DEFAULT_CLIMB_INITIAL; model.dimensions()];
    let width = model.cohort().w_gene().iter().filter(|&&w| w > 0.0).count();
    info!(
        "Tree width {} genes, depth {}, {} repeats",
        width,
        model.max_sites(),
        args.repeats
    );

    let mut loglik = model.loglik(&theta)?;
    let start = Instant::now();
    for _ in 0..args.repeats {
        loglik = black_box(model.loglik(black_box(&theta))?);
    }
    let elapsed = start.elapsed();
    let per_eval = elapsed.as_secs_f64() / args.repeats.max(1) as f64;

    println!("width\t{}", width);
    println!("depth\t{}", model.max_sites());
    println!("loglik\t{}", loglik);
    println!("seconds_per_eval\t{:.6}", per_eval);
    Ok(())
}
