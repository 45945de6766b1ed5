use super::lattice::{neighbours, snap};
use super::results::{ScoredPoint, ThetaKey};
use super::{build_pool, Progress, ProgressCallback, SearchOutcome};
use crate::cancel::CancelToken;
use crate::checkpoint::Checkpoint;
use crate::config::ClimbParams;
use crate::error::{LgResult, LikeligridError};
use crate::model::LikelihoodModel;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ClimbOptions {
    pub step: f64,
    pub initial: f64,
    pub seed: Option<u64>,
    /// Result file; read to resume, rewritten when the climb stops.
    pub output: Option<PathBuf>,
    pub concurrency: usize,
}

impl ClimbOptions {
    pub fn from_params(params: &ClimbParams, concurrency: usize) -> Self {
        Self {
            step: params.step,
            initial: params.initial,
            seed: params.seed,
            output: Some(params.output.clone()),
            concurrency,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClimbReport {
    pub outcome: SearchOutcome,
    pub evaluations: usize,
    pub moves: usize,
    pub best: ScoredPoint,
    /// Every evaluated point, best first.
    pub history: Vec<ScoredPoint>,
}

enum Step {
    Moved(Vec<f64>),
    LocalMax,
    Interrupted,
}

/// Greedy ascent over the lattice of spacing `step`. Each round shuffles the
/// unvisited neighbours of the current point and moves to the first one
/// that improves on it.
pub struct HillClimb<'m, M: LikelihoodModel> {
    model: &'m M,
    options: ClimbOptions,
    pool: Option<rayon::ThreadPool>,
}

impl<'m, M: LikelihoodModel> HillClimb<'m, M> {
    pub fn new(model: &'m M, options: ClimbOptions) -> LgResult<Self> {
        if !(options.step > 0.0 && options.step.is_finite()) {
            return Err(LikeligridError::Config(format!(
                "Step must be positive, got {}",
                options.step
            )));
        }
        if !(options.initial > 0.0 && options.initial.is_finite()) {
            return Err(LikeligridError::Config(format!(
                "Initial value must be positive, got {}",
                options.initial
            )));
        }
        let pool = build_pool(options.concurrency)?;
        Ok(Self {
            model,
            options,
            pool,
        })
    }

    pub fn run<CB: ProgressCallback>(&self, cancel: &CancelToken, callback: CB) -> LgResult<ClimbReport> {
        let mut rng = match self.options.seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        let mut history: BTreeMap<ThetaKey, f64> = BTreeMap::new();
        let mut evaluations = 0;

        let resumed = match &self.options.output {
            Some(path) => Checkpoint::read_from_path(path)?,
            None => None,
        };
        let mut current = match resumed {
            Some(checkpoint) => {
                checkpoint.check_names(self.model.names())?;
                if (checkpoint.step - self.options.step).abs() > 1e-12 {
                    warn!(
                        "Result file was written with step {}, climbing with {}",
                        checkpoint.step,
                        self.options.step
                    );
                }
                let start = checkpoint
                    .best()
                    .map(|p| p.theta.clone())
                    .ok_or_else(|| LikeligridError::Validation("Result file has no rows".into()))?;
                info!(
                    "Resuming from {} evaluated points",
                    checkpoint.rows.len()
                );
                history.extend(
                    checkpoint
                        .rows
                        .into_iter()
                        .map(|p| (ThetaKey(p.theta), p.loglik)),
                );
                start
            }
            None => {
                let start = vec![snap(self.options.initial); self.model.dimensions()];
                let loglik = self.model.loglik(&start)?;
                evaluations += 1;
                history.insert(ThetaKey(start.clone()), loglik);
                start
            }
        };
        info!(
            "Start: loglik {:.6} at {:?}",
            loglik_at(&history, &current),
            current
        );

        let mut moves = 0;
        let outcome = loop {
            if cancel.is_cancelled() {
                break SearchOutcome::Interrupted;
            }
            match self.step(&current, &mut history, &mut rng, cancel, &mut evaluations)? {
                Step::Moved(next) => {
                    moves += 1;
                    let loglik = loglik_at(&history, &next);
                    debug!("move {}: {:.6} at {:?}", moves, loglik, next);
                    current = next;
                    let progress = Progress {
                        stage: 0,
                        offset: history.len(),
                        max_count: 0,
                        evaluations,
                        best_loglik: loglik,
                    };
                    if !callback.on_progress(&progress) {
                        break SearchOutcome::Interrupted;
                    }
                }
                Step::LocalMax => break SearchOutcome::Completed,
                Step::Interrupted => break SearchOutcome::Interrupted,
            }
        };

        let mut ranked: Vec<ScoredPoint> = history
            .into_iter()
            .map(|(ThetaKey(theta), loglik)| ScoredPoint::new(loglik, theta))
            .collect();
        ranked.sort_by(|a, b| b.loglik.total_cmp(&a.loglik));

        if let Some(path) = &self.options.output {
            Checkpoint {
                offset: ranked.len(),
                max_count: 0,
                max_sites: self.model.max_sites(),
                step: self.options.step,
                names: self.model.names().to_vec(),
                rows: ranked.clone(),
            }
            .write_atomic(path)?;
        }

        let best = ranked
            .first()
            .cloned()
            .ok_or_else(|| LikeligridError::Validation("Empty climb history".into()))?;
        match outcome {
            SearchOutcome::Completed => info!("Local maximum {:.6} at {:?}", best.loglik, best.theta),
            SearchOutcome::Interrupted => warn!("Interrupted after {} moves", moves),
        }
        Ok(ClimbReport {
            outcome,
            evaluations,
            moves,
            best,
            history: ranked,
        })
    }

    fn step(
        &self,
        current: &[f64],
        history: &mut BTreeMap<ThetaKey, f64>,
        rng: &mut fastrand::Rng,
        cancel: &CancelToken,
        evaluations: &mut usize,
    ) -> LgResult<Step> {
        let current_loglik = loglik_at(history, current);
        let mut candidates: Vec<Vec<f64>> = neighbours(current, self.options.step)
            .filter(|theta| !history.contains_key(&ThetaKey(theta.clone())))
            .collect();
        rng.shuffle(&mut candidates);

        let width = self.pool.as_ref().map_or(1, |p| p.current_num_threads());
        for chunk in candidates.chunks(width) {
            if cancel.is_cancelled() {
                return Ok(Step::Interrupted);
            }
            let scored: Vec<LgResult<f64>> = match &self.pool {
                Some(pool) => pool.install(|| chunk.par_iter().map(|t| self.model.loglik(t)).collect()),
                None => chunk.iter().map(|t| self.model.loglik(t)).collect(),
            };
            let mut better = None;
            for (theta, loglik) in chunk.iter().zip(scored) {
                let loglik = loglik?;
                *evaluations += 1;
                history.insert(ThetaKey(theta.clone()), loglik);
                if better.is_none() && loglik > current_loglik {
                    better = Some(theta.clone());
                }
            }
            if let Some(next) = better {
                return Ok(Step::Moved(next));
            }
        }
        Ok(Step::LocalMax)
    }
}

fn loglik_at(history: &BTreeMap<ThetaKey, f64>, theta: &[f64]) -> f64 {
    history
        .get(&ThetaKey(theta.to_vec()))
        .copied()
        .unwrap_or(f64::NEG_INFINITY)
}
