mod common;

use itertools::Itertools;
use likeligrid::config::ModelParams;
use likeligrid::error::LikeligridError;
use likeligrid::model::cohort::{ln_factorial, WeightSource};
use likeligrid::model::{GenotypeModel, LikelihoodModel, ModelKind};
use rstest::rstest;

fn params() -> ModelParams {
    ModelParams::default()
}

fn epistasis(pair: (usize, usize), pleiotropy: bool) -> ModelParams {
    ModelParams {
        epistasis: Some(pair),
        pleiotropy,
        ..ModelParams::default()
    }
}

fn closed() -> ModelParams {
    ModelParams {
        model: ModelKind::Closed,
        ..ModelParams::default()
    }
}

/// Σ over samples of ln(s! · Π w / D[s]) with D from the raw weights.
fn multinomial_loglik(model: &GenotypeModel) -> f64 {
    let w = model.cohort().w_gene();
    let d = |s: usize| -> f64 {
        (0..w.len())
            .permutations(s)
            .map(|seq| seq.iter().map(|&g| w[g]).product::<f64>())
            .sum()
    };
    model
        .cohort()
        .samples()
        .iter()
        .map(|genes| {
            let s = genes.len();
            ln_factorial(s) + genes.iter().map(|&g| w[g].ln()).sum::<f64>() - d(s).ln()
        })
        .sum()
}

#[test]
fn test_toy_baseline() {
    // Exchangeable genes with weight 1/4: every two-gene sample has
    // probability 2 · (1/16) / (12/16) = 1/6.
    let model = common::model(common::TOY_JSON);
    assert_eq!(model.dimensions(), 2);
    assert_eq!(model.names(), &["A".to_string(), "B".to_string()]);
    let ll = model.loglik(&[1.0, 1.0]).unwrap();
    assert!(common::approx_eq(ll, 6.0 * (1.0f64 / 6.0).ln(), 1e-12), "got {}", ll);
}

#[rstest]
#[case(common::TOY_JSON)]
#[case(common::MIXED_JSON)]
#[case(common::OVERLAP_JSON)]
fn test_no_penalty_identity(#[case] json: &str) {
    let model = common::model(json);
    let ll = model.loglik(&[1.0, 1.0]).unwrap();
    assert!(common::approx_eq(ll, multinomial_loglik(&model), 1e-10));
}

#[rstest]
#[case(vec![1.0, 1.0])]
#[case(vec![0.4, 1.3])]
#[case(vec![0.05, 2.5])]
fn test_closed_matches_routes_for_disjoint_pathways(#[case] theta: Vec<f64>) {
    let routes = common::model(common::MIXED_JSON);
    let closed = common::model_with(common::MIXED_JSON, &closed());
    let a = routes.loglik(&theta).unwrap();
    let b = closed.loglik(&theta).unwrap();
    assert!(common::approx_eq(a, b, 1e-10), "routes {} closed {}", a, b);
}

#[test]
fn test_closed_matches_routes_at_unit_theta_with_overlap() {
    let routes = common::model(common::OVERLAP_JSON);
    let closed = common::model_with(common::OVERLAP_JSON, &closed());
    let a = routes.loglik(&[1.0, 1.0]).unwrap();
    let b = closed.loglik(&[1.0, 1.0]).unwrap();
    assert!(common::approx_eq(a, b, 1e-10));
}

#[test]
fn test_closed_rejects_epistasis() {
    let params = ModelParams {
        model: ModelKind::Closed,
        ..epistasis((0, 1), false)
    };
    let err = GenotypeModel::new(common::dataset(common::TOY_JSON), &params).unwrap_err();
    assert!(matches!(err, LikeligridError::Config(_)));
}

#[test]
fn test_epistasis_changes_loglik_when_pair_co_occurs() {
    let plain = common::model(common::TOY_JSON);
    let model = common::model_with(common::TOY_JSON, &epistasis((0, 1), false));
    assert_eq!(model.dimensions(), 3);
    assert_eq!(model.names()[2], "A:B");

    // A neutral interaction coefficient reproduces the plain model.
    let base = plain.loglik(&[0.7, 1.1]).unwrap();
    let neutral = model.loglik(&[0.7, 1.1, 1.0]).unwrap();
    assert!(common::approx_eq(base, neutral, 1e-12));

    let tuned = model.loglik(&[0.7, 1.1, 0.3]).unwrap();
    assert!((tuned - base).abs() > 1e-6);
}

#[rstest]
#[case(0.3)]
#[case(1.0)]
#[case(2.7)]
fn test_epistasis_inert_without_co_occurrence(#[case] coefficient: f64) {
    // Pathway C is never mutated, so the pair A:C is never completed.
    let plain = common::model(common::SILENT_PATHWAY_JSON);
    let model = common::model_with(common::SILENT_PATHWAY_JSON, &epistasis((0, 2), false));
    let a = plain.loglik(&[0.6, 0.9, 1.0]).unwrap();
    let b = model.loglik(&[0.6, 0.9, 1.0, coefficient]).unwrap();
    assert!(common::approx_eq(a, b, 1e-12));
}

#[test]
fn test_pleiotropy_adds_named_slot() {
    let model = common::model_with(common::OVERLAP_JSON, &epistasis((0, 1), true));
    assert_eq!(model.dimensions(), 4);
    assert_eq!(model.names()[3], "A:B:pleiotropy");
    // Gene 1 hits both pathways at once, so the slot matters.
    let a = model.loglik(&[0.8, 0.8, 1.2, 1.0]).unwrap();
    let b = model.loglik(&[0.8, 0.8, 1.2, 0.5]).unwrap();
    assert!((a - b).abs() > 1e-6);
}

#[rstest]
#[case::same_index((1, 1))]
#[case::out_of_range((0, 5))]
fn test_bad_epistasis_pair(#[case] pair: (usize, usize)) {
    let err = GenotypeModel::new(common::dataset(common::TOY_JSON), &epistasis(pair, false));
    assert!(matches!(err, Err(LikeligridError::Config(_))));
}

#[test]
fn test_pleiotropy_requires_pair() {
    let params = ModelParams {
        pleiotropy: true,
        ..ModelParams::default()
    };
    let err = GenotypeModel::new(common::dataset(common::TOY_JSON), &params);
    assert!(matches!(err, Err(LikeligridError::Config(_))));
}

#[test]
fn test_short_theta_is_error() {
    let model = common::model(common::TOY_JSON);
    assert!(matches!(
        model.loglik(&[1.0]),
        Err(LikeligridError::Validation(_))
    ));
}

#[test]
fn test_zero_theta_rejects_candidate() {
    let model = common::model(common::TOY_JSON);
    let ll = model.loglik(&[0.0, 1.0]).unwrap();
    assert_eq!(ll, f64::NEG_INFINITY);
}

#[test]
fn test_max_sites_drops_large_samples() {
    let capped = ModelParams {
        max_sites: 2,
        ..params()
    };
    let model = common::model_with(common::MIXED_JSON, &capped);
    assert_eq!(model.max_sites(), 2);
    assert_eq!(model.cohort().num_dropped(), 1);
    assert_eq!(model.cohort().histogram(), &[1, 3, 3]);
    assert_eq!(model.cohort().observed_histogram(), &[1, 3, 3, 1]);
    assert!(model.loglik(&[0.9, 0.9]).unwrap().is_finite());
}

#[test]
fn test_huge_max_sites_keeps_every_sample() {
    let uncapped = ModelParams {
        max_sites: usize::MAX,
        ..params()
    };
    let model = common::model_with(common::MIXED_JSON, &uncapped);
    assert_eq!(model.cohort().num_dropped(), 0);
    assert_eq!(model.cohort().histogram(), &[1, 3, 3, 1]);
    assert_eq!(model.max_sites(), 3);
}

#[test]
fn test_repeat_hits_skip_dropped_samples() {
    let all = common::model(common::MIXED_JSON);
    assert_eq!(all.repeat_hits(), &[2.0, 1.0]);

    let capped = ModelParams {
        max_sites: 2,
        ..params()
    };
    // The dropped sample hits pathway A twice.
    let model = common::model_with(common::MIXED_JSON, &capped);
    assert_eq!(model.repeat_hits(), &[1.0, 1.0]);
}

#[test]
fn test_weight_source_choice() {
    let retained = ModelParams {
        max_sites: 2,
        ..params()
    };
    let cohort = ModelParams {
        weight_source: WeightSource::Cohort,
        ..retained.clone()
    };
    let a = common::model_with(common::MIXED_JSON, &retained);
    let b = common::model_with(common::MIXED_JSON, &cohort);
    // The dropped sample mutates genes 0, 1 and 2.
    assert!(common::approx_eq(a.cohort().w_gene()[3], 2.0 / 9.0, 1e-12));
    assert!(common::approx_eq(b.cohort().w_gene()[3], 2.0 / 12.0, 1e-12));
}

#[test]
fn test_lnp_sample_matches_route_sum() {
    let model = common::model(common::MIXED_JSON);
    let w = model.cohort().w_gene();
    let theta = [0.5, 0.5];
    // Genes 0 and 1 share pathway A: both routes pay θ_A once.
    let expected = (w[0] * w[1] * 2.0 * 0.5).ln();
    let got = model.lnp_sample(&[0, 1], &theta).unwrap();
    assert!(common::approx_eq(got, expected, 1e-12));
    assert!(model.lnp_sample(&[7], &theta).is_err());
}
