use crate::consts::{
    DEFAULT_CLIMB_INITIAL, DEFAULT_CLIMB_STEP, DEFAULT_GRID_INITIAL, DEFAULT_MAX_RESULTS,
    DEFAULT_MAX_SITES, DEFAULT_SNAPSHOT_INTERVAL, GRID_BREAKS, GRID_STEPS,
};
use crate::error::{LgResult, LikeligridError};
use crate::model::cohort::WeightSource;
use crate::model::ModelKind;
use crate::search::grid::Stage;
use clap::Args;
use itertools::Itertools;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Args, Debug, Clone)]
pub struct ModelParams {
    /// Samples with more mutations than this are left out of the likelihood
    #[arg(short = 's', long, default_value_t = DEFAULT_MAX_SITES)]
    pub max_sites: usize,

    /// Pathway index pair with its own interaction coefficient, e.g. `0,1`
    #[arg(short = 'e', long, value_parser = parse_pair)]
    pub epistasis: Option<(usize, usize)>,

    /// Add a separate coefficient for genes hitting both pathways of the pair at once
    #[arg(long, default_value_t = false, requires = "epistasis")]
    pub pleiotropy: bool,

    #[arg(long, default_value_t = ModelKind::Routes)]
    pub model: ModelKind,

    #[arg(long, default_value_t = WeightSource::Retained)]
    pub weight_source: WeightSource,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            max_sites: DEFAULT_MAX_SITES,
            epistasis: None,
            pleiotropy: false,
            model: ModelKind::Routes,
            weight_source: WeightSource::Retained,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GridParams {
    /// Step of each refinement stage, coarse to fine
    #[arg(long, default_value = "0.4,0.2,0.1,0.05,0.02,0.01")]
    pub steps: String,

    /// Points per axis of each stage
    #[arg(long, default_value = "5,5,5,5,6,5")]
    pub breaks: String,

    /// Centre of the first stage in every dimension
    #[arg(long, default_value_t = DEFAULT_GRID_INITIAL)]
    pub initial: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Points evaluated between checkpoint writes
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_INTERVAL)]
    pub snapshot: usize,

    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            steps: GRID_STEPS.iter().join(","),
            breaks: GRID_BREAKS.iter().join(","),
            initial: DEFAULT_GRID_INITIAL,
            max_results: DEFAULT_MAX_RESULTS,
            snapshot: DEFAULT_SNAPSHOT_INTERVAL,
            outdir: PathBuf::from("."),
        }
    }
}

impl GridParams {
    pub fn schedule(&self) -> LgResult<Vec<Stage>> {
        let steps: Vec<f64> = parse_list(&self.steps, "steps")?;
        let breaks: Vec<usize> = parse_list(&self.breaks, "breaks")?;
        if steps.len() != breaks.len() {
            return Err(LikeligridError::Config(format!(
                "--steps has {} values but --breaks has {}",
                steps.len(),
                breaks.len()
            )));
        }
        if steps.is_empty() {
            return Err(LikeligridError::Config("Empty grid schedule".into()));
        }
        if let Some(bad) = steps.iter().find(|&&s| !(s > 0.0 && s.is_finite())) {
            return Err(LikeligridError::Config(format!("Invalid step {}", bad)));
        }
        if breaks.contains(&0) {
            return Err(LikeligridError::Config("Breaks must be positive".into()));
        }
        Ok(steps
            .into_iter()
            .zip(breaks)
            .map(|(step, breaks)| Stage { step, breaks })
            .collect())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClimbParams {
    /// Lattice spacing of the neighbourhood
    #[arg(long, default_value_t = DEFAULT_CLIMB_STEP)]
    pub step: f64,

    /// Starting coefficient in every dimension
    #[arg(long, default_value_t = DEFAULT_CLIMB_INITIAL)]
    pub initial: f64,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(short, long, default_value = "climb.tsv.gz")]
    pub output: PathBuf,
}

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            step: DEFAULT_CLIMB_STEP,
            initial: DEFAULT_CLIMB_INITIAL,
            seed: None,
            output: PathBuf::from("climb.tsv.gz"),
        }
    }
}

pub fn parse_list<T: FromStr>(s: &str, name: &str) -> LgResult<Vec<T>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<T>()
                .map_err(|_| LikeligridError::Config(format!("Invalid value '{}' in --{}", p, name)))
        })
        .collect()
}

fn parse_pair(s: &str) -> Result<(usize, usize), String> {
    let parts: Vec<usize> = parse_list(s, "epistasis").map_err(|e| e.to_string())?;
    match parts.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(format!("expected two pathway indices, got '{}'", s)),
    }
}
