pub mod annotation;
pub mod cohort;
pub mod denoms;
pub mod discount;
pub mod sample;

use self::annotation::{AnnotationTable, PathMask};
use self::cohort::{Cohort, WeightSource};
use self::discount::DiscountRule;
use crate::config::ModelParams;
use crate::consts::DEFAULT_MAX_SITES;
use crate::dataset::Dataset;
use crate::error::{LgResult, LikeligridError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumString};
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// The objective every search driver climbs.
pub trait LikelihoodModel: Send + Sync {
    /// Log-likelihood of θ. Degenerate candidates score `f64::NEG_INFINITY`;
    /// only a θ that is too short is an error.
    fn loglik(&self, theta: &[f64]) -> LgResult<f64>;

    /// Number of coefficients in θ.
    fn dimensions(&self) -> usize;

    /// Column name of each coefficient.
    fn names(&self) -> &[String];

    /// Largest mutation count in the likelihood.
    fn max_sites(&self) -> usize;
}

/// How the per-sample numerator is obtained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModelKind {
    /// Sum the discount over every ordering of each sample's mutations.
    #[default]
    Routes,
    /// Closed form from repeated hits per pathway; plain discounts only.
    Closed,
}

#[derive(TypedBuilder)]
pub struct ModelBuildParams {
    pub dataset: Dataset,
    #[builder(default = DEFAULT_MAX_SITES)]
    pub max_sites: usize,
    #[builder(default)]
    pub epistasis: Option<(usize, usize)>,
    #[builder(default = false)]
    pub pleiotropy: bool,
    #[builder(default)]
    pub kind: ModelKind,
    #[builder(default)]
    pub weight_source: WeightSource,
}

impl ModelBuildParams {
    pub fn build_model(self) -> LgResult<GenotypeModel> {
        let annotation = AnnotationTable::from_dataset(&self.dataset);
        let num_pathways = annotation.num_pathways();

        let rule = match self.epistasis {
            Some(pair) => DiscountRule::with_epistasis(pair, num_pathways, self.pleiotropy)?,
            None if self.pleiotropy => {
                return Err(LikeligridError::Config(
                    "Pleiotropy needs an epistasis pair".into(),
                ))
            }
            None => DiscountRule::plain(),
        };
        if self.kind == ModelKind::Closed && rule.epistasis().is_some() {
            return Err(LikeligridError::Config(
                "The closed model does not support epistasis; use --model routes".into(),
            ));
        }

        let mut names = annotation.names().to_vec();
        if let Some(pair) = rule.epistasis() {
            let label = format!(
                "{}:{}",
                annotation.names()[pair.first],
                annotation.names()[pair.second]
            );
            info!("epistasis: {}", label);
            if pair.pleiotropy_idx != pair.epistasis_idx {
                names.push(label.clone());
                names.push(format!("{}:pleiotropy", label));
            } else {
                names.push(label);
            }
        }

        let cohort = Cohort::build(&self.dataset, self.max_sites, self.weight_source)?;

        // Counted over retained samples, like the histogram.
        let repeat_hits: Vec<f64> = (0..num_pathways)
            .map(|j| {
                let bit: PathMask = 1 << j;
                cohort
                    .samples()
                    .iter()
                    .map(|genes| {
                        let hits = genes.iter().filter(|&&g| annotation.mask(g) & bit != 0).count();
                        hits.saturating_sub(1)
                    })
                    .sum::<usize>() as f64
            })
            .collect();

        let lnp_const = match self.kind {
            ModelKind::Routes => cohort.ln_weight_const(),
            ModelKind::Closed => cohort.ln_weight_const() + cohort.ln_route_count_const(),
        };
        debug!("repeat hits per pathway: {:?}", repeat_hits);
        info!(
            "Model: {} | {} pathways x {} genes | {} samples | max_sites {} | lnp_const {:.6}",
            self.kind,
            num_pathways,
            annotation.num_genes(),
            cohort.samples().len(),
            cohort.max_sites(),
            lnp_const
        );

        Ok(GenotypeModel {
            names,
            annotation,
            cohort,
            rule,
            kind: self.kind,
            repeat_hits,
            lnp_const,
        })
    }
}

/// Log-likelihood engine: the annotation table, the cohort statistics and
/// the discount rule, all fixed after construction.
#[derive(Debug, Clone)]
pub struct GenotypeModel {
    names: Vec<String>,
    annotation: AnnotationTable,
    cohort: Cohort,
    rule: DiscountRule,
    kind: ModelKind,
    repeat_hits: Vec<f64>,
    lnp_const: f64,
}

impl GenotypeModel {
    pub fn new(dataset: Dataset, params: &ModelParams) -> LgResult<Self> {
        ModelBuildParams::builder()
            .dataset(dataset)
            .max_sites(params.max_sites)
            .epistasis(params.epistasis)
            .pleiotropy(params.pleiotropy)
            .kind(params.model)
            .weight_source(params.weight_source)
            .build()
            .build_model()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, params: &ModelParams) -> LgResult<Self> {
        Self::new(Dataset::load_from_file(path)?, params)
    }

    pub fn annotation(&self) -> &AnnotationTable {
        &self.annotation
    }

    pub fn cohort(&self) -> &Cohort {
        &self.cohort
    }

    pub fn rule(&self) -> &DiscountRule {
        &self.rule
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn lnp_const(&self) -> f64 {
        self.lnp_const
    }

    /// Repeated hits per pathway summed over retained samples.
    pub fn repeat_hits(&self) -> &[f64] {
        &self.repeat_hits
    }

    /// `D[0..=max_sites]` for θ.
    pub fn denominators(&self, theta: &[f64]) -> LgResult<Vec<f64>> {
        self.check_theta(theta)?;
        Ok(denoms::denominators(
            self.cohort.w_gene(),
            self.annotation.masks(),
            &self.rule,
            theta,
            self.cohort.max_sites(),
        ))
    }

    /// `ln P(sample | θ)` for a set of mutated genes, by summing over routes.
    pub fn lnp_sample(&self, genes: &[usize], theta: &[f64]) -> LgResult<f64> {
        self.check_theta(theta)?;
        if let Some(&g) = genes.iter().find(|&&g| g >= self.annotation.num_genes()) {
            return Err(LikeligridError::Validation(format!(
                "Gene index {} out of range for {} genes",
                g,
                self.annotation.num_genes()
            )));
        }
        Ok(sample::lnp_sample(
            genes,
            self.cohort.w_gene(),
            self.annotation.masks(),
            &self.rule,
            theta,
        ))
    }

    fn check_theta(&self, theta: &[f64]) -> LgResult<()> {
        let needed = self.dimensions();
        if theta.len() < needed {
            return Err(LikeligridError::Validation(format!(
                "θ has {} entries, the model needs {}",
                theta.len(),
                needed
            )));
        }
        Ok(())
    }

    fn numerator(&self, theta: &[f64]) -> f64 {
        match self.kind {
            ModelKind::Routes => self
                .cohort
                .samples()
                .iter()
                .map(|genes| {
                    sample::route_sum(genes, self.annotation.masks(), &self.rule, theta).ln()
                })
                .sum(),
            ModelKind::Closed => self
                .repeat_hits
                .iter()
                .zip(theta)
                .filter(|(&a, _)| a > 0.0)
                .map(|(&a, &th)| a * th.ln())
                .sum(),
        }
    }
}

impl LikelihoodModel for GenotypeModel {
    fn loglik(&self, theta: &[f64]) -> LgResult<f64> {
        let denoms = self.denominators(theta)?;
        let mut loglik = self.lnp_const + self.numerator(theta);
        for (s, &n) in self.cohort.histogram().iter().enumerate().skip(2) {
            if n == 0 {
                continue;
            }
            let d = denoms[s];
            if !(d > 0.0 && d.is_finite()) {
                return Ok(f64::NEG_INFINITY);
            }
            loglik -= n as f64 * d.ln();
        }
        if loglik.is_nan() || loglik == f64::INFINITY {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(loglik)
    }

    fn dimensions(&self) -> usize {
        self.rule.dimensions(self.annotation.num_pathways())
    }

    fn names(&self) -> &[String] {
        &self.names
    }

    fn max_sites(&self) -> usize {
        self.cohort.max_sites()
    }
}
