use super::annotation::PathMask;
use super::discount::DiscountRule;
use itertools::Itertools;

/// Sum of route discounts over every ordering of `genes`.
///
/// Orderings are visited in lexicographic order of positions in `genes`;
/// the sum does not depend on that order. One mutation or none admits a
/// single undiscounted route.
pub fn route_sum(genes: &[usize], masks: &[PathMask], rule: &DiscountRule, theta: &[f64]) -> f64 {
    if genes.len() <= 1 {
        return 1.0;
    }
    genes
        .iter()
        .permutations(genes.len())
        .map(|route| rule.route(theta, route.into_iter().map(|&g| masks[g])))
        .sum()
}

/// `ln P(sample | θ)`: the weight product times the route sum.
pub fn lnp_sample(
    genes: &[usize],
    w_gene: &[f64],
    masks: &[PathMask],
    rule: &DiscountRule,
    theta: &[f64],
) -> f64 {
    let p_basic: f64 = genes.iter().map(|&g| w_gene[g]).product();
    (p_basic * route_sum(genes, masks, rule, theta)).ln()
}
