use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One evaluated coefficient vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub loglik: f64,
    pub theta: Vec<f64>,
}

impl ScoredPoint {
    pub fn new(loglik: f64, theta: Vec<f64>) -> Self {
        Self { loglik, theta }
    }
}

/// θ as an ordered map key. Lattice coordinates are snapped before they get
/// here, so equal points compare equal bit for bit.
#[derive(Debug, Clone)]
pub struct ThetaKey(pub Vec<f64>);

impl PartialEq for ThetaKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ThetaKey {}

impl PartialOrd for ThetaKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ThetaKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_theta(&self.0, &other.0)
    }
}

fn cmp_theta(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

// Heap entry: loglik first, θ breaks ties so the order is total.
#[derive(Debug, Clone)]
struct Ranked(ScoredPoint);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .loglik
            .total_cmp(&other.0.loglik)
            .then_with(|| cmp_theta(&other.0.theta, &self.0.theta))
    }
}

/// Keeps the `capacity` best points seen so far. The worst entry sits on
/// top of a min-heap and is evicted first.
#[derive(Debug, Clone)]
pub struct ResultTable {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl ResultTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(4096) + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn insert(&mut self, point: ScoredPoint) {
        self.heap.push(Reverse(Ranked(point)));
        while self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    /// Lowest log-likelihood still in the table.
    pub fn worst(&self) -> Option<&ScoredPoint> {
        self.heap.peek().map(|Reverse(r)| &r.0)
    }

    pub fn best(&self) -> Option<&ScoredPoint> {
        self.heap.iter().map(|Reverse(r)| r).max().map(|r| &r.0)
    }

    /// Entries best first.
    pub fn to_sorted_vec(&self) -> Vec<ScoredPoint> {
        let mut ranked: Vec<&Ranked> = self.heap.iter().map(|Reverse(r)| r).collect();
        ranked.sort_by(|a, b| b.cmp(a));
        ranked.into_iter().map(|r| r.0.clone()).collect()
    }
}

impl Extend<ScoredPoint> for ResultTable {
    fn extend<I: IntoIterator<Item = ScoredPoint>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}
