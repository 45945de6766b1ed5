use super::lattice::{vicinity, Lattice};
use super::results::{ResultTable, ScoredPoint};
use super::{build_pool, Progress, ProgressCallback, SearchOutcome};
use crate::cancel::CancelToken;
use crate::checkpoint::Checkpoint;
use crate::config::GridParams;
use crate::error::{LgResult, LikeligridError};
use crate::model::LikelihoodModel;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One refinement stage: `breaks` points per axis, `step` apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub step: f64,
    pub breaks: usize,
}

impl Stage {
    pub fn file_name(&self) -> String {
        format!("grid-{:.2}.tsv.gz", self.step)
    }
}

#[derive(Debug, Clone)]
pub struct GridOptions {
    pub stages: Vec<Stage>,
    pub initial: f64,
    pub max_results: usize,
    pub snapshot_interval: usize,
    pub outdir: PathBuf,
    pub concurrency: usize,
}

impl GridOptions {
    pub fn from_params(params: &GridParams, concurrency: usize) -> LgResult<Self> {
        Ok(Self {
            stages: params.schedule()?,
            initial: params.initial,
            max_results: params.max_results,
            snapshot_interval: params.snapshot,
            outdir: params.outdir.clone(),
            concurrency,
        })
    }

    fn validate(&self) -> LgResult<()> {
        if !(self.initial > 0.0 && self.initial.is_finite()) {
            return Err(LikeligridError::Config(format!(
                "Initial value must be positive, got {}",
                self.initial
            )));
        }
        if self.max_results == 0 || self.snapshot_interval == 0 {
            return Err(LikeligridError::Config(
                "max_results and snapshot must be positive".into(),
            ));
        }
        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.file_name()) {
                return Err(LikeligridError::Config(format!(
                    "Two stages share the result file {}",
                    stage.file_name()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub step: f64,
    pub max_count: usize,
    pub evaluations: usize,
    pub best: ScoredPoint,
}

#[derive(Debug, Clone)]
pub struct GridReport {
    pub outcome: SearchOutcome,
    /// Likelihood evaluations performed by this run.
    pub evaluations: usize,
    pub stages: Vec<StageReport>,
    /// Table of the last stage reached, best first.
    pub results: Vec<ScoredPoint>,
    /// Axes a further stage around the final best point would scan.
    pub next_axes: Vec<Vec<f64>>,
}

impl GridReport {
    pub fn best(&self) -> Option<&ScoredPoint> {
        self.results.first()
    }
}

/// Coarse-to-fine grid search with resumable per-stage result files.
pub struct GridSearch<'m, M: LikelihoodModel> {
    model: &'m M,
    options: GridOptions,
    pool: Option<rayon::ThreadPool>,
}

impl<'m, M: LikelihoodModel> GridSearch<'m, M> {
    pub fn new(model: &'m M, options: GridOptions) -> LgResult<Self> {
        options.validate()?;
        let pool = build_pool(options.concurrency)?;
        Ok(Self {
            model,
            options,
            pool,
        })
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn stage_path(&self, stage: &Stage) -> PathBuf {
        self.options.outdir.join(stage.file_name())
    }

    pub fn run<CB: ProgressCallback>(&self, cancel: &CancelToken, callback: CB) -> LgResult<GridReport> {
        let dims = self.model.dimensions();
        let mut center = vec![self.options.initial; dims];
        let mut evaluations = 0;
        let mut reports = Vec::with_capacity(self.options.stages.len());
        let mut results = Vec::new();
        let mut last = None;
        let mut stop_requested = false;

        for (k, stage) in self.options.stages.iter().enumerate() {
            if stop_requested || cancel.is_cancelled() {
                warn!("Stopped before stage {} (step {})", k, stage.step);
                return Ok(GridReport {
                    outcome: SearchOutcome::Interrupted,
                    evaluations,
                    stages: reports,
                    results,
                    next_axes: Vec::new(),
                });
            }
            let lattice = Lattice::around(&center, stage.breaks, stage.step);
            let path = self.stage_path(stage);
            let mut run = self.open_stage(k, stage, &lattice, &path)?;

            if run.offset < lattice.len() {
                info!(
                    "Stage {} (step {}): points {}..{} of {}",
                    k,
                    stage.step,
                    run.offset,
                    lattice.len(),
                    lattice.len()
                );
                let start = Instant::now();
                let outcome = self.scan(
                    k,
                    stage,
                    &lattice,
                    &path,
                    &mut run,
                    cancel,
                    &callback,
                    evaluations,
                    &mut stop_requested,
                )?;
                evaluations += run.evaluations;
                debug!("stage {} scanned in {:.2?}", k, start.elapsed());
                if outcome == SearchOutcome::Interrupted {
                    warn!(
                        "Interrupted at {}/{}; rerun to resume from {}",
                        run.offset,
                        lattice.len(),
                        path.display()
                    );
                    if !run.table.is_empty() {
                        results = run.table.to_sorted_vec();
                    }
                    return Ok(GridReport {
                        outcome,
                        evaluations,
                        stages: reports,
                        results,
                        next_axes: Vec::new(),
                    });
                }
            } else {
                info!("Stage {} (step {}): already complete", k, stage.step);
            }

            let best = run.table.best().cloned().ok_or_else(|| {
                LikeligridError::Validation(format!("Stage {} produced no results", k))
            })?;
            info!("Stage {} best loglik {:.6} at {:?}", k, best.loglik, best.theta);
            center = best.theta.clone();
            reports.push(StageReport {
                step: stage.step,
                max_count: lattice.len(),
                evaluations: run.evaluations,
                best,
            });
            results = run.table.to_sorted_vec();
            last = Some(*stage);
        }

        let next_axes = last
            .map(|s| vicinity(&center, s.breaks, s.step))
            .unwrap_or_default();
        for (name, axis) in self.model.names().iter().zip(&next_axes) {
            debug!("{}: {:?}", name, axis);
        }

        Ok(GridReport {
            outcome: SearchOutcome::Completed,
            evaluations,
            stages: reports,
            results,
            next_axes,
        })
    }

    fn open_stage(
        &self,
        k: usize,
        stage: &Stage,
        lattice: &Lattice,
        path: &Path,
    ) -> LgResult<StageRun> {
        let mut run = StageRun {
            offset: 0,
            evaluations: 0,
            table: ResultTable::new(self.options.max_results),
        };
        let Some(checkpoint) = Checkpoint::read_from_path(path)? else {
            return Ok(run);
        };
        checkpoint.check_names(self.model.names())?;
        if checkpoint.max_count != lattice.len() || checkpoint.offset > checkpoint.max_count {
            return Err(LikeligridError::Validation(format!(
                "{} has {}/{} points, stage {} has {}",
                path.display(),
                checkpoint.offset,
                checkpoint.max_count,
                k,
                lattice.len()
            )));
        }
        if (checkpoint.step - stage.step).abs() > 1e-12 {
            return Err(LikeligridError::Validation(format!(
                "{} was written with step {}, stage {} uses {}",
                path.display(),
                checkpoint.step,
                k,
                stage.step
            )));
        }
        if checkpoint.max_sites != self.model.max_sites() {
            warn!(
                "{} was written with max_sites {}, model uses {}",
                path.display(),
                checkpoint.max_sites,
                self.model.max_sites()
            );
        }
        debug!("resuming {} at {}", path.display(), checkpoint.offset);
        run.offset = checkpoint.offset;
        run.table.extend(checkpoint.rows);
        Ok(run)
    }

    #[allow(clippy::too_many_arguments)]
    fn scan<CB: ProgressCallback>(
        &self,
        k: usize,
        stage: &Stage,
        lattice: &Lattice,
        path: &Path,
        run: &mut StageRun,
        cancel: &CancelToken,
        callback: &CB,
        done_before: usize,
        stop_requested: &mut bool,
    ) -> LgResult<SearchOutcome> {
        let max_count = lattice.len();
        let evaluate = |i: usize| -> LgResult<Option<ScoredPoint>> {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let theta = lattice.point(i);
            let loglik = self.model.loglik(&theta)?;
            Ok(Some(ScoredPoint::new(loglik, theta)))
        };

        let mut outcome = SearchOutcome::Completed;
        while run.offset < max_count {
            let start = run.offset;
            let end = (start + self.options.snapshot_interval).min(max_count);
            let batch: Vec<LgResult<Option<ScoredPoint>>> = match &self.pool {
                Some(pool) => pool.install(|| (start..end).into_par_iter().map(evaluate).collect()),
                None => (start..end).map(evaluate).collect(),
            };

            // Only the unbroken prefix counts; later points are redone on resume.
            let committed_before = run.offset;
            for result in batch {
                match result? {
                    Some(point) => {
                        run.table.insert(point);
                        run.offset += 1;
                        run.evaluations += 1;
                    }
                    None => {
                        outcome = SearchOutcome::Interrupted;
                        break;
                    }
                }
            }

            if run.offset > committed_before {
                self.snapshot(stage, path, run, max_count)?;
            }
            if outcome == SearchOutcome::Interrupted {
                break;
            }

            let progress = Progress {
                stage: k,
                offset: run.offset,
                max_count,
                evaluations: done_before + run.evaluations,
                best_loglik: run.table.best().map_or(f64::NEG_INFINITY, |p| p.loglik),
            };
            if !callback.on_progress(&progress) {
                *stop_requested = true;
                if run.offset < max_count {
                    outcome = SearchOutcome::Interrupted;
                    break;
                }
            }
        }
        Ok(outcome)
    }

    fn snapshot(&self, stage: &Stage, path: &Path, run: &StageRun, max_count: usize) -> LgResult<()> {
        Checkpoint {
            offset: run.offset,
            max_count,
            max_sites: self.model.max_sites(),
            step: stage.step,
            names: self.model.names().to_vec(),
            rows: run.table.to_sorted_vec(),
        }
        .write_atomic(path)
    }
}

struct StageRun {
    offset: usize,
    evaluations: usize,
    table: ResultTable,
}
