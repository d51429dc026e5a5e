//! Raw-efficiency bin classification.
//!
//! Bins are right-open intervals `[edges[i], edges[i+1])`, except the last,
//! which is closed so that the upper domain edge (typically E = 1) belongs
//! to it. A value exactly on an interior edge goes to the upper bin.
//! Values outside `[edges[0], edges[B]]` are handled by a [`BoundaryPolicy`].

use bva_common::{BurstId, Error, Result};
use bva_config::validate::validate_bin_edges;
use bva_config::BoundaryPolicy;
use serde::Serialize;

/// Validated, strictly increasing bin edges (at least two).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BinEdges {
    edges: Vec<f64>,
}

/// Where a value falls relative to the bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside bin `i`.
    Bin(usize),
    /// Below the first edge (NaN is reported here too).
    Below,
    /// Above the last edge.
    Above,
}

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        validate_bin_edges(&edges)?;
        Ok(BinEdges { edges })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// First edge.
    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    /// Last edge.
    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// `(lower, upper)` edges of bin `i`.
    pub fn bounds(&self, i: usize) -> (f64, f64) {
        (self.edges[i], self.edges[i + 1])
    }

    /// Midpoint of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        let (lo, hi) = self.bounds(i);
        lo + 0.5 * (hi - lo)
    }

    /// Midpoints of all bins, in bin order.
    pub fn centers(&self) -> Vec<f64> {
        (0..self.num_bins()).map(|i| self.center(i)).collect()
    }

    /// Locate `value` by binary search over the edges.
    pub fn locate(&self, value: f64) -> Placement {
        if value.is_nan() || value < self.lower() {
            return Placement::Below;
        }
        let upper = self.upper();
        if value > upper {
            return Placement::Above;
        }
        if value == upper {
            return Placement::Bin(self.num_bins() - 1);
        }
        // number of edges <= value; at least 1 because value >= edges[0]
        let idx = self.edges.partition_point(|&e| e <= value);
        Placement::Bin(idx - 1)
    }

    /// Resolve the bin of a burst's raw efficiency under `policy`.
    ///
    /// Returns `Ok(None)` when the burst is excluded from binning.
    pub fn classify(
        &self,
        burst: BurstId,
        raw_efficiency: f64,
        policy: BoundaryPolicy,
    ) -> Result<Option<usize>> {
        let edge_bin = match self.locate(raw_efficiency) {
            Placement::Bin(i) => return Ok(Some(i)),
            Placement::Below => 0,
            Placement::Above => self.num_bins() - 1,
        };
        match policy {
            BoundaryPolicy::Exclude => Ok(None),
            BoundaryPolicy::Clamp if !raw_efficiency.is_nan() => Ok(Some(edge_bin)),
            BoundaryPolicy::Clamp | BoundaryPolicy::Strict => Err(Error::OutOfRangeEfficiency {
                burst,
                value: raw_efficiency,
                lower: self.lower(),
                upper: self.upper(),
            }),
        }
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = Error;

    fn try_from(edges: Vec<f64>) -> Result<Self> {
        BinEdges::new(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(v: &[f64]) -> BinEdges {
        BinEdges::new(v.to_vec()).unwrap()
    }

    #[test]
    fn rejects_malformed_edges() {
        assert!(matches!(
            BinEdges::new(vec![0.5]),
            Err(Error::MalformedBinEdges(_))
        ));
        assert!(matches!(
            BinEdges::new(vec![0.0, 0.0]),
            Err(Error::MalformedBinEdges(_))
        ));
    }

    #[test]
    fn interior_edge_goes_to_upper_bin() {
        let e = edges(&[0.0, 0.5, 1.0]);
        assert_eq!(e.locate(0.0), Placement::Bin(0));
        assert_eq!(e.locate(0.49), Placement::Bin(0));
        assert_eq!(e.locate(0.5), Placement::Bin(1));
    }

    #[test]
    fn last_bin_is_closed() {
        let e = edges(&[0.0, 0.5, 1.0]);
        assert_eq!(e.locate(1.0), Placement::Bin(1));
    }

    #[test]
    fn outside_values() {
        let e = edges(&[0.2, 0.5, 0.8]);
        assert_eq!(e.locate(0.1), Placement::Below);
        assert_eq!(e.locate(0.9), Placement::Above);
        assert_eq!(e.locate(f64::NAN), Placement::Below);
    }

    #[test]
    fn classify_policies() {
        let e = edges(&[0.2, 0.5, 0.8]);
        let id = BurstId(5);
        assert_eq!(e.classify(id, 0.3, BoundaryPolicy::Strict).unwrap(), Some(0));
        assert_eq!(e.classify(id, 0.1, BoundaryPolicy::Exclude).unwrap(), None);
        assert_eq!(e.classify(id, 0.1, BoundaryPolicy::Clamp).unwrap(), Some(0));
        assert_eq!(e.classify(id, 0.95, BoundaryPolicy::Clamp).unwrap(), Some(1));

        let err = e.classify(id, 0.95, BoundaryPolicy::Strict).unwrap_err();
        match err {
            Error::OutOfRangeEfficiency {
                burst,
                value,
                lower,
                upper,
            } => {
                assert_eq!(burst, id);
                assert_eq!(value, 0.95);
                assert_eq!(lower, 0.2);
                assert_eq!(upper, 0.8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nan_cannot_be_clamped() {
        let e = edges(&[0.0, 1.0]);
        assert!(e.classify(BurstId(0), f64::NAN, BoundaryPolicy::Clamp).is_err());
        assert_eq!(
            e.classify(BurstId(0), f64::NAN, BoundaryPolicy::Exclude).unwrap(),
            None
        );
    }

    #[test]
    fn centers_lie_within_bins() {
        let e = edges(&[0.0, 0.1, 0.35, 1.0]);
        let centers = e.centers();
        assert_eq!(centers.len(), 3);
        assert!((centers[0] - 0.05).abs() < 1e-12);
        assert!((centers[1] - 0.225).abs() < 1e-12);
        for (i, c) in centers.iter().enumerate() {
            let (lo, hi) = e.bounds(i);
            assert!(lo <= *c && *c <= hi);
        }
    }

    #[test]
    fn many_bins_binary_search() {
        let v: Vec<f64> = (0..=20).map(|k| k as f64 * 0.05).collect();
        let e = edges(&v);
        assert_eq!(e.num_bins(), 20);
        assert_eq!(e.locate(0.07), Placement::Bin(1));
        assert_eq!(e.locate(0.999), Placement::Bin(19));
        assert_eq!(e.locate(1.0), Placement::Bin(19));
    }
}
