use crate::consts::LATTICE_SCALE;
use itertools::Itertools;

/// Rounds a coordinate onto the lattice resolution.
#[inline]
pub fn snap(x: f64) -> f64 {
    (x * LATTICE_SCALE).round() / LATTICE_SCALE
}

/// Axis values around each centre coordinate: `breaks` points spaced by
/// `step`, centred on the coordinate, descending. Values that are not
/// strictly positive are dropped.
pub fn vicinity(center: &[f64], breaks: usize, step: f64) -> Vec<Vec<f64>> {
    let half = (breaks as f64 - 1.0) / 2.0;
    center
        .iter()
        .map(|&x| {
            (0..breaks)
                .map(|i| snap(x + (half - i as f64) * step))
                .filter(|&v| v > 0.0)
                .collect()
        })
        .collect()
}

/// Every combination of one value per axis, in lattice order.
pub fn neighbours(center: &[f64], step: f64) -> impl Iterator<Item = Vec<f64>> {
    vicinity(center, 3, step)
        .into_iter()
        .map(|axis| axis.into_iter())
        .multi_cartesian_product()
}

/// Cartesian product of per-axis values, addressed by index. The last axis
/// varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    axes: Vec<Vec<f64>>,
    len: usize,
}

impl Lattice {
    pub fn new(axes: Vec<Vec<f64>>) -> Self {
        let len = if axes.is_empty() {
            0
        } else {
            axes.iter().fold(1usize, |n, a| n.saturating_mul(a.len()))
        };
        Self { axes, len }
    }

    pub fn around(center: &[f64], breaks: usize, step: f64) -> Self {
        Self::new(vicinity(center, breaks, step))
    }

    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Point number `index`, `index < len()`.
    pub fn point(&self, mut index: usize) -> Vec<f64> {
        let mut theta = vec![0.0; self.axes.len()];
        for (slot, axis) in theta.iter_mut().zip(&self.axes).rev() {
            *slot = axis[index % axis.len()];
            index /= axis.len();
        }
        theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vicinity_odd_breaks() {
        let axes = vicinity(&[1.2], 5, 0.4);
        assert_eq!(axes[0], vec![2.0, 1.6, 1.2, 0.8, 0.4]);
    }

    #[test]
    fn test_vicinity_drops_non_positive() {
        let axes = vicinity(&[0.4], 5, 0.4);
        assert_eq!(axes[0], vec![1.2, 0.8, 0.4]);
    }

    #[test]
    fn test_vicinity_even_breaks_straddle_centre() {
        let axes = vicinity(&[1.0], 6, 0.02);
        assert_eq!(axes[0], vec![1.05, 1.03, 1.01, 0.99, 0.97, 0.95]);
    }

    #[test]
    fn test_point_last_axis_fastest() {
        let lattice = Lattice::new(vec![vec![1.0, 2.0], vec![10.0, 20.0, 30.0]]);
        assert_eq!(lattice.len(), 6);
        assert_eq!(lattice.point(0), vec![1.0, 10.0]);
        assert_eq!(lattice.point(1), vec![1.0, 20.0]);
        assert_eq!(lattice.point(3), vec![2.0, 10.0]);
        assert_eq!(lattice.point(5), vec![2.0, 30.0]);
    }

    #[test]
    fn test_neighbours_include_centre() {
        let all: Vec<Vec<f64>> = neighbours(&[0.5, 0.5], 0.01).collect();
        assert_eq!(all.len(), 9);
        assert!(all.contains(&vec![0.5, 0.5]));
        assert!(all.contains(&vec![0.51, 0.49]));
    }
}
