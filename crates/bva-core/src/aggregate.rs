//! Per-bin aggregation of sub-burst ratios and burst dispersions.
//!
//! Each bin keeps two [`RunningMoments`]: one over every sub-burst ratio of
//! every burst assigned to it (pooled mode), and one over the per-burst
//! dispersions (burst-mean mode). Both are filled in the same pass and both
//! merge commutatively, so bursts can be sharded across workers.
//!
//! A bin reports a value only when its sample count is strictly greater than
//! the threshold; otherwise it reports [`SENTINEL`]. Empty bins always
//! report the sentinel.

use crate::binning::BinEdges;
use bva_common::{Error, Result};
use bva_math::RunningMoments;
use serde::{Deserialize, Serialize};

/// Value reported for bins with too few samples.
pub const SENTINEL: f64 = -1.0;

/// Accumulated samples of one efficiency bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BinAccumulator {
    /// All sub-burst ratios of the bin's bursts.
    pub sub_bursts: RunningMoments,
    /// One dispersion value per burst in the bin.
    pub burst_dispersions: RunningMoments,
}

impl BinAccumulator {
    /// Add one burst's window ratios and its dispersion.
    pub fn add_burst(&mut self, ratios: &[f64], dispersion: f64) {
        self.sub_bursts.extend(ratios);
        self.burst_dispersions.push(dispersion);
    }

    pub fn merge(&mut self, other: &BinAccumulator) {
        self.sub_bursts.merge(&other.sub_bursts);
        self.burst_dispersions.merge(&other.burst_dispersions);
    }

    pub fn num_bursts(&self) -> u64 {
        self.burst_dispersions.count()
    }

    pub fn num_sub_bursts(&self) -> u64 {
        self.sub_bursts.count()
    }
}

/// One accumulator per bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinAccumulators {
    bins: Vec<BinAccumulator>,
}

impl BinAccumulators {
    pub fn new(num_bins: usize) -> Self {
        BinAccumulators {
            bins: vec![BinAccumulator::default(); num_bins],
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, bin: usize) -> Option<&BinAccumulator> {
        self.bins.get(bin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinAccumulator> + '_ {
        self.bins.iter()
    }

    /// Add a burst to `bin`.
    ///
    /// `bin` comes from [`BinEdges::classify`] on the same edges, so it is
    /// always in range.
    pub fn add_burst(&mut self, bin: usize, ratios: &[f64], dispersion: f64) {
        self.bins[bin].add_burst(ratios, dispersion);
    }

    /// Fold in accumulators built over a disjoint set of bursts.
    pub fn merge(&mut self, other: &BinAccumulators) -> Result<()> {
        if self.bins.len() != other.bins.len() {
            return Err(Error::MalformedBinEdges(format!(
                "cannot merge accumulators over {} and {} bins",
                self.bins.len(),
                other.bins.len()
            )));
        }
        for (mine, theirs) in self.bins.iter_mut().zip(&other.bins) {
            mine.merge(theirs);
        }
        Ok(())
    }

    /// Curve of pooled sub-burst standard deviations.
    pub fn pooled_curve(&self, edges: &BinEdges, threshold: u64) -> BvaCurve {
        self.curve(edges, threshold, AggregationMode::PooledSubBursts)
    }

    /// Curve of mean per-burst dispersions.
    pub fn burst_mean_curve(&self, edges: &BinEdges, threshold: u64) -> BvaCurve {
        self.curve(edges, threshold, AggregationMode::BurstMean)
    }

    fn curve(&self, edges: &BinEdges, threshold: u64, mode: AggregationMode) -> BvaCurve {
        let points = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, acc)| {
                let (lower, upper) = edges.bounds(i);
                let (samples, statistic) = match mode {
                    AggregationMode::PooledSubBursts => {
                        (acc.num_sub_bursts(), acc.sub_bursts.population_std())
                    }
                    AggregationMode::BurstMean => {
                        (acc.num_bursts(), acc.burst_dispersions.mean())
                    }
                };
                let value = match statistic {
                    Some(v) if samples > threshold => Some(v),
                    _ => None,
                };
                CurvePoint {
                    bin: i,
                    lower,
                    upper,
                    center: edges.center(i),
                    value: value.unwrap_or(SENTINEL),
                    reported: value.is_some(),
                    num_bursts: acc.num_bursts(),
                    num_sub_bursts: acc.num_sub_bursts(),
                }
            })
            .collect();

        BvaCurve {
            mode,
            threshold,
            points,
        }
    }
}

/// How a bin's samples are reduced to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Standard deviation over all pooled sub-burst ratios, gated on the
    /// number of sub-bursts.
    PooledSubBursts,
    /// Mean of per-burst dispersions, gated on the number of bursts.
    BurstMean,
}

/// One bin of the output curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub bin: usize,
    pub lower: f64,
    pub upper: f64,
    pub center: f64,
    /// Aggregated dispersion, or [`SENTINEL`] when not reported.
    pub value: f64,
    pub reported: bool,
    pub num_bursts: u64,
    pub num_sub_bursts: u64,
}

/// Ordered (bin center, value) curve, one point per bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BvaCurve {
    pub mode: AggregationMode,
    pub threshold: u64,
    pub points: Vec<CurvePoint>,
}

impl BvaCurve {
    pub fn centers(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.center).collect()
    }

    /// Values in bin order; unreported bins hold [`SENTINEL`].
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// `(center, value)` pairs.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.center, p.value)).collect()
    }

    pub fn num_reported(&self) -> usize {
        self.points.iter().filter(|p| p.reported).count()
    }
}
