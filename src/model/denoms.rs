use super::annotation::PathMask;
use super::discount::DiscountRule;

/// Normalizing constants `D[0..=max_sites]` for one θ.
///
/// `D[s]` sums, over every ordered sequence of `s` distinct genes, the
/// product of gene weights and route discounts. `D[0]` and `D[1]` stay
/// undiscounted. The tree is rebuilt on every call.
pub fn denominators(
    w_gene: &[f64],
    masks: &[PathMask],
    rule: &DiscountRule,
    theta: &[f64],
    max_sites: usize,
) -> Vec<f64> {
    let mut e = Enumerator {
        w_gene,
        masks,
        rule,
        theta,
        max_sites,
        mutated: vec![false; w_gene.len()],
        denoms: vec![0.0; max_sites + 1],
    };
    e.denoms[0] = 1.0;
    if max_sites > 0 {
        e.descend(0, 0, 1.0);
    }
    e.denoms
}

struct Enumerator<'a> {
    w_gene: &'a [f64],
    masks: &'a [PathMask],
    rule: &'a DiscountRule,
    theta: &'a [f64],
    max_sites: usize,
    // Scratch reused across branches: set on the way down, cleared on the way up.
    mutated: Vec<bool>,
    denoms: Vec<f64>,
}

impl Enumerator<'_> {
    fn descend(&mut self, depth: usize, pathtype: PathMask, anc_p: f64) {
        let s = depth + 1;
        for g in 0..self.w_gene.len() {
            if self.mutated[g] {
                continue;
            }
            let w = self.w_gene[g];
            if w == 0.0 {
                continue;
            }
            let mut_path = self.masks[g];
            let p = anc_p * w * self.rule.factor(self.theta, pathtype, mut_path);
            self.denoms[s] += if s == 1 { w } else { p };
            if s < self.max_sites && p != 0.0 {
                self.mutated[g] = true;
                self.descend(s, pathtype | mut_path, p);
                self.mutated[g] = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_exchangeable_genes() {
        let w = [0.5, 0.5];
        let masks = [0b1, 0b1];
        let d = denominators(&w, &masks, &DiscountRule::plain(), &[0.2], 2);
        assert_eq!(d.len(), 3);
        assert_eq!(d[0], 1.0);
        assert!((d[1] - 1.0).abs() < 1e-12);
        // Two orders, each 0.25 * 0.2.
        assert!((d[2] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_depth_zero() {
        let d = denominators(&[1.0], &[0b1], &DiscountRule::plain(), &[0.5], 0);
        assert_eq!(d, vec![1.0]);
    }
}
