//! Discount applied to a mutation given the pathways already hit.
//!
//! A mutation whose pathways were all hit before pays the product of their
//! coefficients. When an epistasis pair `(a, b)` is configured, completing
//! the pair pays the epistasis coefficient, and hitting both members with a
//! single first mutation pays the pleiotropy coefficient.

use super::annotation::PathMask;
use crate::error::{LgResult, LikeligridError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpistasisPair {
    pub first: usize,
    pub second: usize,
    /// Index of the epistasis coefficient in θ.
    pub epistasis_idx: usize,
    /// Index of the pleiotropy coefficient in θ; equals `epistasis_idx`
    /// when no separate pleiotropy coefficient is configured.
    pub pleiotropy_idx: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscountRule {
    epistasis: Option<EpistasisPair>,
}

impl DiscountRule {
    pub fn plain() -> Self {
        Self { epistasis: None }
    }

    pub fn with_epistasis(
        pair: (usize, usize),
        num_pathways: usize,
        pleiotropy: bool,
    ) -> LgResult<Self> {
        let (first, second) = pair;
        if first == second {
            return Err(LikeligridError::Config(format!(
                "Epistasis pair must name two different pathways, got {}:{}",
                first, second
            )));
        }
        if first >= num_pathways || second >= num_pathways {
            return Err(LikeligridError::Config(format!(
                "Epistasis pair {}:{} out of range for {} pathways",
                first, second, num_pathways
            )));
        }
        let epistasis_idx = num_pathways;
        let pleiotropy_idx = if pleiotropy {
            epistasis_idx + 1
        } else {
            epistasis_idx
        };
        Ok(Self {
            epistasis: Some(EpistasisPair {
                first,
                second,
                epistasis_idx,
                pleiotropy_idx,
            }),
        })
    }

    pub fn epistasis(&self) -> Option<&EpistasisPair> {
        self.epistasis.as_ref()
    }

    /// Number of θ entries this rule reads for `num_pathways` pathways.
    pub fn dimensions(&self, num_pathways: usize) -> usize {
        match self.epistasis {
            None => num_pathways,
            Some(e) => e.pleiotropy_idx.max(e.epistasis_idx) + 1,
        }
    }

    /// Discount for adding a gene with pathways `mut_path` after `pathtype`.
    #[inline(always)]
    pub fn factor(&self, theta: &[f64], pathtype: PathMask, mut_path: PathMask) -> f64 {
        let p = recurrent(theta, pathtype, mut_path);
        match &self.epistasis {
            Some(pair) => p * interaction(pair, theta, pathtype, mut_path),
            None => p,
        }
    }

    /// Total discount along one ordering of mutations, starting from no
    /// pathway hit.
    pub fn route<I>(&self, theta: &[f64], route: I) -> f64
    where
        I: IntoIterator<Item = PathMask>,
    {
        let mut pathtype: PathMask = 0;
        let mut p = 1.0;
        for mut_path in route {
            p *= self.factor(theta, pathtype, mut_path);
            pathtype |= mut_path;
        }
        p
    }
}

#[inline(always)]
fn recurrent(theta: &[f64], pathtype: PathMask, mut_path: PathMask) -> f64 {
    if mut_path & !pathtype != 0 {
        return 1.0;
    }
    let mut p = 1.0;
    let mut bits = mut_path;
    while bits != 0 {
        p *= theta[bits.trailing_zeros() as usize];
        bits &= bits - 1;
    }
    p
}

// The branch order matters: a completed pair is neutral, completing it
// pays epistasis, and only a simultaneous first hit pays pleiotropy.
#[inline(always)]
fn interaction(pair: &EpistasisPair, theta: &[f64], pathtype: PathMask, mut_path: PathMask) -> f64 {
    let a: PathMask = 1 << pair.first;
    let b: PathMask = 1 << pair.second;
    let hit = |m: PathMask| pathtype & m != 0;
    let adds = |m: PathMask| mut_path & m != 0;

    if hit(a) {
        if hit(b) {
            return 1.0;
        }
        if adds(b) {
            return theta[pair.epistasis_idx];
        }
    }
    if hit(b) && adds(a) {
        return theta[pair.epistasis_idx];
    }
    if adds(a) && adds(b) {
        return theta[pair.pleiotropy_idx];
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PathMask = 0b01;
    const B: PathMask = 0b10;

    #[test]
    fn test_plain_discount_only_on_repeat() {
        let rule = DiscountRule::plain();
        let theta = [0.5, 0.25];
        assert_eq!(rule.factor(&theta, 0, A), 1.0);
        assert_eq!(rule.factor(&theta, A, A), 0.5);
        assert_eq!(rule.factor(&theta, A | B, A | B), 0.125);
        // Opens B, so no penalty even though A repeats.
        assert_eq!(rule.factor(&theta, A, A | B), 1.0);
    }

    #[test]
    fn test_gene_without_pathway_is_free() {
        let rule = DiscountRule::plain();
        assert_eq!(rule.factor(&[0.1, 0.1], A | B, 0), 1.0);
    }

    #[test]
    fn test_epistasis_precedence() {
        let rule = DiscountRule::with_epistasis((0, 1), 2, true).unwrap();
        let theta = [0.5, 0.25, 3.0, 7.0];
        // Completing the pair from either side.
        assert_eq!(rule.factor(&theta, A, B), 3.0);
        assert_eq!(rule.factor(&theta, B, A), 3.0);
        // Simultaneous first hit.
        assert_eq!(rule.factor(&theta, 0, A | B), 7.0);
        // Pair already complete: plain rule only.
        assert_eq!(rule.factor(&theta, A | B, B), 0.25);
        // Neither special case.
        assert_eq!(rule.factor(&theta, A, A), 0.5);
    }

    #[test]
    fn test_pleiotropy_shares_epistasis_slot_when_disabled() {
        let rule = DiscountRule::with_epistasis((1, 0), 2, false).unwrap();
        assert_eq!(rule.dimensions(2), 3);
        assert_eq!(rule.factor(&[1.0, 1.0, 4.0], 0, A | B), 4.0);
    }

    #[test]
    fn test_identical_pair_rejected() {
        assert!(DiscountRule::with_epistasis((1, 1), 3, false).is_err());
        assert!(DiscountRule::with_epistasis((0, 3), 3, false).is_err());
    }
}
