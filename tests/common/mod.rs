#![allow(dead_code)]

use likeligrid::cancel::CancelToken;
use likeligrid::config::ModelParams;
use likeligrid::dataset::Dataset;
use likeligrid::error::LgResult;
use likeligrid::model::{GenotypeModel, LikelihoodModel};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Two pathways over four genes; every sample carries two mutations and
/// every gene is mutated three times.
pub const TOY_JSON: &str = r#"{
    "pathway": ["A", "B"],
    "annotation": ["0011", "1100"],
    "sample": ["0011", "0101", "1001", "0110", "1010", "1100"]
}"#;

/// Uneven counts and sample sizes from 0 to 3.
pub const MIXED_JSON: &str = r#"{
    "pathway": ["A", "B"],
    "annotation": ["0011", "1100"],
    "sample": ["0001", "0011", "0101", "1100", "0111", "0010", "1000", "0000"]
}"#;

/// Pathway C holds genes that no sample mutates.
pub const SILENT_PATHWAY_JSON: &str = r#"{
    "pathway": ["A", "B", "C"],
    "annotation": ["000011", "001100", "110000"],
    "sample": ["000011", "000101", "001001", "000110", "001010", "001100", "000111"]
}"#;

/// Gene 1 sits in both A and B.
pub const OVERLAP_JSON: &str = r#"{
    "pathway": ["A", "B"],
    "annotation": ["0011", "1110"],
    "sample": ["0011", "0110", "1010", "0101", "1100", "0111", "0010"]
}"#;

pub fn dataset(json: &str) -> Dataset {
    Dataset::from_json_str(json).expect("fixture parses")
}

pub fn model(json: &str) -> GenotypeModel {
    model_with(json, &ModelParams::default())
}

pub fn model_with(json: &str, params: &ModelParams) -> GenotypeModel {
    GenotypeModel::new(dataset(json), params).expect("fixture model builds")
}

pub fn write_fixture(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).expect("write fixture");
    path
}

pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

/// Counts calls to `loglik` and optionally cancels after a fixed number.
pub struct CountingModel<'a, M: LikelihoodModel> {
    inner: &'a M,
    calls: AtomicUsize,
    cancel_after: Option<(usize, CancelToken)>,
}

impl<'a, M: LikelihoodModel> CountingModel<'a, M> {
    pub fn new(inner: &'a M) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    pub fn cancelling_after(inner: &'a M, after: usize, token: CancelToken) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            cancel_after: Some((after, token)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<M: LikelihoodModel> LikelihoodModel for CountingModel<'_, M> {
    fn loglik(&self, theta: &[f64]) -> LgResult<f64> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, token)) = &self.cancel_after {
            if n >= *after {
                token.cancel();
            }
        }
        self.inner.loglik(theta)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn names(&self) -> &[String] {
        self.inner.names()
    }

    fn max_sites(&self) -> usize {
        self.inner.max_sites()
    }
}
