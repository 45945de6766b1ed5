mod common;

use itertools::Itertools;
use likeligrid::config::ModelParams;
use likeligrid::model::annotation::PathMask;
use likeligrid::model::denoms::denominators;
use likeligrid::model::discount::DiscountRule;
use rstest::rstest;

/// D[s] by listing every ordered sequence of `s` distinct genes.
fn brute_force(w: &[f64], masks: &[PathMask], rule: &DiscountRule, theta: &[f64], s: usize) -> f64 {
    (0..w.len())
        .permutations(s)
        .map(|seq| {
            let weight: f64 = seq.iter().map(|&g| w[g]).product();
            weight * rule.route(theta, seq.iter().map(|&g| masks[g]))
        })
        .sum()
}

#[rstest]
#[case::plain(DiscountRule::plain(), vec![0.3, 0.7])]
#[case::epistasis(DiscountRule::with_epistasis((0, 1), 2, false).unwrap(), vec![0.3, 0.7, 1.9])]
#[case::pleiotropy(DiscountRule::with_epistasis((0, 1), 2, true).unwrap(), vec![0.3, 0.7, 1.9, 0.2])]
fn test_recursion_matches_brute_force(#[case] rule: DiscountRule, #[case] theta: Vec<f64>) {
    let w = [0.1, 0.2, 0.3, 0.15, 0.25];
    // Gene 2 in both pathways, gene 4 in none.
    let masks: [PathMask; 5] = [0b01, 0b01, 0b11, 0b10, 0b00];
    let d = denominators(&w, &masks, &rule, &theta, 5);
    assert_eq!(d.len(), 6);
    for s in 2..=5 {
        let expected = brute_force(&w, &masks, &rule, &theta, s);
        assert!(
            common::approx_eq(d[s], expected, 1e-12),
            "D[{}] = {} but brute force gives {}",
            s,
            d[s],
            expected
        );
    }
}

#[rstest]
#[case(vec![1.0, 1.0])]
#[case(vec![0.0, 0.5])]
#[case(vec![3.0, 0.01])]
fn test_base_cases_ignore_theta(#[case] theta: Vec<f64>) {
    let w = [0.4, 0.1, 0.2, 0.3];
    let masks: [PathMask; 4] = [0b01, 0b01, 0b10, 0b11];
    let d = denominators(&w, &masks, &DiscountRule::plain(), &theta, 3);
    assert_eq!(d[0], 1.0);
    assert!(common::approx_eq(d[1], 1.0, 1e-12));
}

#[test]
fn test_no_discount_gives_elementary_sums() {
    // With θ = 1, D[s] = s! · e_s(w).
    let w = [0.5, 0.25, 0.25];
    let masks: [PathMask; 3] = [0b1, 0b1, 0b1];
    let d = denominators(&w, &masks, &DiscountRule::plain(), &[1.0], 3);
    let e2 = 0.5 * 0.25 + 0.5 * 0.25 + 0.25 * 0.25;
    let e3 = 0.5 * 0.25 * 0.25;
    assert!(common::approx_eq(d[2], 2.0 * e2, 1e-12));
    assert!(common::approx_eq(d[3], 6.0 * e3, 1e-12));
}

#[test]
fn test_zero_weight_genes_do_not_contribute() {
    let masks: [PathMask; 3] = [0b1, 0b10, 0b1];
    let rule = DiscountRule::plain();
    let with_zero = denominators(&[0.5, 0.5, 0.0], &masks, &rule, &[0.3, 0.8], 2);
    let without = denominators(&[0.5, 0.5], &masks[..2], &rule, &[0.3, 0.8], 2);
    assert_eq!(with_zero, without);
}

#[test]
fn test_engine_denominators_use_cohort_weights() {
    let model = common::model_with(common::MIXED_JSON, &ModelParams::default());
    let d = model.denominators(&[0.5, 0.5]).unwrap();
    assert_eq!(d.len(), model.cohort().max_sites() + 1);
    assert_eq!(d.len(), 4);
    let masks = model.annotation().masks();
    let w = model.cohort().w_gene();
    let expected = brute_force(w, masks, model.rule(), &[0.5, 0.5], 3);
    assert!(common::approx_eq(d[3], expected, 1e-12));
}
