//! Mergeable running moments (count, sum, sum of squares).
//!
//! A [`RunningMoments`] is updated one sample at a time and can be combined
//! with another accumulator built over a disjoint set of samples. The merge
//! is commutative and associative, so partial results from independent
//! shards can be folded in any order before the final reduction.

use serde::{Deserialize, Serialize};

/// Running count / sum / sum-of-squares accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMoments {
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl RunningMoments {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &RunningMoments) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    /// Combine two accumulators without mutating either.
    pub fn combined(mut self, other: &RunningMoments) -> RunningMoments {
        self.merge(other);
        self
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean of the samples, or None when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }

    /// Population variance (divide by count), or None when empty.
    ///
    /// Clamped at 0 to absorb rounding in `E[x²] - E[x]²`.
    pub fn population_variance(&self) -> Option<f64> {
        let mean = self.mean()?;
        let n = self.count as f64;
        let var = self.sum_sq / n - mean * mean;
        if var.is_nan() {
            return Some(f64::NAN);
        }
        Some(var.max(0.0))
    }

    /// Population standard deviation, or None when empty.
    pub fn population_std(&self) -> Option<f64> {
        self.population_variance().map(f64::sqrt)
    }
}

impl Extend<f64> for RunningMoments {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl<'a> Extend<&'a f64> for RunningMoments {
    fn extend<I: IntoIterator<Item = &'a f64>>(&mut self, iter: I) {
        for &x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for RunningMoments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut m = RunningMoments::new();
        m.extend(iter);
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::stable::{mean, population_std};

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn empty_has_no_statistics() {
        let m = RunningMoments::new();
        assert!(m.is_empty());
        assert_eq!(m.mean(), None);
        assert_eq!(m.population_std(), None);
    }

    #[test]
    fn single_sample_has_zero_spread() {
        let m: RunningMoments = [0.25].into_iter().collect();
        assert_eq!(m.count(), 1);
        assert_eq!(m.mean(), Some(0.25));
        assert_eq!(m.population_std(), Some(0.0));
    }

    #[test]
    fn matches_two_pass_reference() {
        let v = [1.0, 0.0, 0.5, 0.25, 0.75, 1.0, 0.0];
        let m: RunningMoments = v.iter().copied().collect();
        assert!(approx_eq(m.mean().unwrap(), mean(&v), 1e-12));
        assert!(approx_eq(m.population_std().unwrap(), population_std(&v), 1e-12));
    }

    #[test]
    fn merge_equals_concatenation() {
        let a = [0.1, 0.2, 0.9];
        let b = [0.4, 0.6];
        let mut left: RunningMoments = a.iter().copied().collect();
        let right: RunningMoments = b.iter().copied().collect();
        left.merge(&right);

        let all: RunningMoments = a.iter().chain(b.iter()).copied().collect();
        assert_eq!(left.count(), all.count());
        assert!(approx_eq(left.sum(), all.sum(), 1e-12));
        assert!(approx_eq(left.sum_sq(), all.sum_sq(), 1e-12));
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let m: RunningMoments = [0.3, 0.7].into_iter().collect();
        let merged = m.combined(&RunningMoments::new());
        assert_eq!(merged, m);
    }

    #[test]
    fn extend_by_reference() {
        let v = vec![1.0, 0.0];
        let mut m = RunningMoments::new();
        m.extend(&v);
        assert!(approx_eq(m.population_std().unwrap(), 0.5, 1e-15));
    }
}
