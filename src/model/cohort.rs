use crate::dataset::Dataset;
use crate::error::{LgResult, LikeligridError};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

/// Which samples feed the empirical gene weights.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WeightSource {
    /// Only samples within the mutation-count cap.
    #[default]
    Retained,
    /// Every sample, including those dropped from the likelihood.
    Cohort,
}

/// Per-sample mutation sets plus the cohort-level statistics the
/// likelihood needs. Immutable once built.
#[derive(Debug, Clone)]
pub struct Cohort {
    samples: Vec<Vec<usize>>,
    observed_histogram: Vec<usize>,
    histogram: Vec<usize>,
    retained_counts: Vec<usize>,
    w_gene: Vec<f64>,
    max_sites: usize,
    num_dropped: usize,
}

impl Cohort {
    pub fn build(dataset: &Dataset, max_sites: usize, source: WeightSource) -> LgResult<Self> {
        let num_genes = dataset.num_genes();
        if dataset.samples.is_empty() {
            return Err(LikeligridError::Validation("Dataset has no samples".into()));
        }

        let mut samples = Vec::with_capacity(dataset.samples.len());
        let mut observed_histogram = vec![0usize; num_genes + 1];
        let mut retained_counts = vec![0usize; num_genes];
        let mut cohort_counts = vec![0usize; num_genes];
        let mut num_dropped = 0;

        for bits in &dataset.samples {
            let genes: Vec<usize> = bits
                .iter()
                .enumerate()
                .filter_map(|(g, &b)| b.then_some(g))
                .collect();
            observed_histogram[genes.len()] += 1;
            for &g in &genes {
                cohort_counts[g] += 1;
            }
            if genes.len() > max_sites {
                num_dropped += 1;
                continue;
            }
            for &g in &genes {
                retained_counts[g] += 1;
            }
            samples.push(genes);
        }

        rstrip(&mut observed_histogram);
        info!("Original N_s: {:?}", observed_histogram);

        let mut histogram = observed_histogram.clone();
        if max_sites < histogram.len().saturating_sub(1) {
            histogram.truncate(max_sites.saturating_add(1));
            rstrip(&mut histogram);
            info!("Using N_s: {:?} ({} samples dropped)", histogram, num_dropped);
        } else {
            debug!("max_sites {} does not drop any sample", max_sites);
        }

        let weight_counts = match source {
            WeightSource::Retained => &retained_counts,
            WeightSource::Cohort => &cohort_counts,
        };
        let total: usize = weight_counts.iter().sum();
        if total == 0 {
            return Err(LikeligridError::Validation(
                "No mutations observed; gene weights are undefined".into(),
            ));
        }
        let w_gene: Vec<f64> = weight_counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect();
        debug!("w_gene: {:?}", w_gene);

        let unobserved = w_gene.iter().filter(|&&w| w == 0.0).count();
        if unobserved > 0 {
            warn!("{} genes are never mutated and carry zero weight", unobserved);
        }

        let max_sites = histogram.len().saturating_sub(1);
        Ok(Self {
            samples,
            observed_histogram,
            histogram,
            retained_counts,
            w_gene,
            max_sites,
            num_dropped,
        })
    }

    /// Mutated gene indices (ascending) of each retained sample.
    pub fn samples(&self) -> &[Vec<usize>] {
        &self.samples
    }

    /// `nsam_with_s[s]` over the retained range, right-trimmed.
    pub fn histogram(&self) -> &[usize] {
        &self.histogram
    }

    /// Histogram over every sample before the cap is applied.
    pub fn observed_histogram(&self) -> &[usize] {
        &self.observed_histogram
    }

    pub fn w_gene(&self) -> &[f64] {
        &self.w_gene
    }

    /// Times each gene is mutated among retained samples.
    pub fn retained_counts(&self) -> &[usize] {
        &self.retained_counts
    }

    /// Largest mutation count present after the cap.
    pub fn max_sites(&self) -> usize {
        self.max_sites
    }

    pub fn num_dropped(&self) -> usize {
        self.num_dropped
    }

    /// `Σ_g count[g] · ln w[g]` over retained samples.
    pub fn ln_weight_const(&self) -> f64 {
        self.retained_counts
            .iter()
            .zip(&self.w_gene)
            .filter(|(&c, _)| c > 0)
            .map(|(&c, &w)| c as f64 * w.ln())
            .sum()
    }

    /// `Σ_s nsam_with_s[s] · ln s!`, the number of routes per sample at θ = 1.
    pub fn ln_route_count_const(&self) -> f64 {
        self.histogram
            .iter()
            .enumerate()
            .skip(2)
            .map(|(s, &n)| n as f64 * ln_factorial(s))
            .sum()
    }
}

pub fn ln_factorial(n: usize) -> f64 {
    (2..=n).map(|k| (k as f64).ln()).sum()
}

fn rstrip(v: &mut Vec<usize>) {
    while v.last() == Some(&0) {
        v.pop();
    }
}
