//! Analysis driver: runs the pipeline over a photon stream.
//!
//! Every burst is visited once. For each burst the driver splits it into
//! sub-bursts, computes the acceptor ratio of every window and the burst's
//! dispersion, estimates its raw efficiency, and (for the binned statistics)
//! files the burst under one efficiency bin. Per-burst results and both
//! curves come out of the same traversal.

use crate::aggregate::{BinAccumulators, BvaCurve};
use crate::binning::BinEdges;
use crate::dispersion::burst_dispersion;
use crate::efficiency::raw_efficiency;
use crate::segment::sub_burst_ratios;
use crate::stream::{Burst, PhotonStream};
use bva_common::{BurstId, Error, Result, StreamLabel};
use bva_config::validate::{coverage_gap, validate_window_size};
use bva_config::{AnalysisConfig, BoundaryPolicy};
use serde::Serialize;
use std::thread;
use tracing::{debug, error, warn};

/// Parameters of one analysis run, validated up front.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub window_size: usize,
    pub edges: BinEdges,
    pub threshold: u64,
    pub boundary_policy: BoundaryPolicy,
    pub acceptor: StreamLabel,
}

impl AnalysisParams {
    pub fn new(window_size: usize, edges: BinEdges, threshold: u64) -> Result<Self> {
        validate_window_size(window_size)?;
        Ok(AnalysisParams {
            window_size,
            edges,
            threshold,
            boundary_policy: BoundaryPolicy::default(),
            acceptor: StreamLabel::default(),
        })
    }

    /// Build parameters from a loaded config, expanding its bin spec.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let edges = BinEdges::new(config.bin_edges()?)?;
        Ok(AnalysisParams::new(config.window_size, edges, config.threshold)?
            .with_boundary_policy(config.boundary_policy)
            .with_acceptor(config.acceptor))
    }

    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }

    pub fn with_acceptor(mut self, acceptor: StreamLabel) -> Self {
        self.acceptor = acceptor;
        self
    }
}

/// Result of the pipeline for one burst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurstBva {
    pub burst: BurstId,
    /// Number of photons in the burst.
    pub size: usize,
    pub raw_efficiency: f64,
    pub num_sub_bursts: usize,
    /// Population std of the burst's sub-burst ratios.
    pub bva: f64,
    /// Efficiency bin, or None when the burst was not binned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<usize>,
}

/// Complete analysis output: per-burst results plus both curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BvaAnalysis {
    pub num_photons: usize,
    pub bursts: Vec<BurstBva>,
    /// Bursts left out of binning by the `exclude` boundary policy.
    pub excluded_bursts: usize,
    /// Pooled sub-burst standard deviation per bin.
    pub pooled: BvaCurve,
    /// Mean per-burst dispersion per bin.
    pub burst_mean: BvaCurve,
}

/// Accumulated state over a subset of bursts.
///
/// Partial results over disjoint burst sets merge into the result over
/// their union.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAnalysis {
    bursts: Vec<BurstBva>,
    accumulators: BinAccumulators,
    excluded: usize,
}

impl PartialAnalysis {
    pub fn new(num_bins: usize) -> Self {
        PartialAnalysis {
            bursts: Vec::new(),
            accumulators: BinAccumulators::new(num_bins),
            excluded: 0,
        }
    }

    pub fn accumulators(&self) -> &BinAccumulators {
        &self.accumulators
    }

    pub fn bursts(&self) -> &[BurstBva] {
        &self.bursts
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    fn add(&mut self, burst: &Burst, params: &AnalysisParams) -> Result<()> {
        let (mut result, ratios) = evaluate_burst(burst, params.window_size, params.acceptor)?;
        result.bin = params
            .edges
            .classify(burst.id(), result.raw_efficiency, params.boundary_policy)?;
        match result.bin {
            Some(bin) => self.accumulators.add_burst(bin, &ratios, result.bva),
            None => {
                debug!(
                    burst = %burst.id(),
                    raw_efficiency = result.raw_efficiency,
                    "burst outside bin range, excluded"
                );
                self.excluded += 1;
            }
        }
        self.bursts.push(result);
        Ok(())
    }

    /// Fold in the result over a disjoint set of bursts.
    ///
    /// Per-burst results stay in ascending burst id order.
    pub fn merge(&mut self, other: PartialAnalysis) -> Result<()> {
        self.accumulators.merge(&other.accumulators)?;
        self.excluded += other.excluded;
        self.bursts.extend(other.bursts);
        self.bursts.sort_by_key(|b| b.burst);
        Ok(())
    }

    /// Reduce the accumulators to curves.
    pub fn finish(self, params: &AnalysisParams) -> BvaAnalysis {
        if self.excluded > 0 {
            warn!(
                excluded = self.excluded,
                lower = params.edges.lower(),
                upper = params.edges.upper(),
                "bursts with raw efficiency outside the bin range were excluded"
            );
        }
        let pooled = self
            .accumulators
            .pooled_curve(&params.edges, params.threshold);
        let burst_mean = self
            .accumulators
            .burst_mean_curve(&params.edges, params.threshold);
        debug!(
            bins = params.edges.num_bins(),
            reported = pooled.num_reported(),
            "bin aggregation complete"
        );
        BvaAnalysis {
            num_photons: self.bursts.iter().map(|b| b.size).sum(),
            bursts: self.bursts,
            excluded_bursts: self.excluded,
            pooled,
            burst_mean,
        }
    }
}

fn evaluate_burst(
    burst: &Burst,
    window_size: usize,
    acceptor: StreamLabel,
) -> Result<(BurstBva, Vec<f64>)> {
    let ratios = sub_burst_ratios(burst.labels(), window_size, acceptor)?;
    let result = BurstBva {
        burst: burst.id(),
        size: burst.len(),
        raw_efficiency: raw_efficiency(burst, acceptor),
        num_sub_bursts: ratios.len(),
        bva: burst_dispersion(&ratios),
        bin: None,
    };
    Ok((result, ratios))
}

/// Accumulate an arbitrary set of bursts.
pub fn accumulate<'a, I>(bursts: I, params: &AnalysisParams) -> Result<PartialAnalysis>
where
    I: IntoIterator<Item = &'a Burst>,
{
    let mut partial = PartialAnalysis::new(params.edges.num_bins());
    for burst in bursts {
        partial.add(burst, params)?;
    }
    Ok(partial)
}

/// Per-burst dispersion only, no binning.
pub fn per_burst_bva(
    stream: &PhotonStream,
    window_size: usize,
    acceptor: StreamLabel,
) -> Result<Vec<BurstBva>> {
    validate_window_size(window_size)?;
    debug!(
        bursts = stream.num_bursts(),
        window_size, "computing per-burst dispersion"
    );
    stream
        .iter()
        .map(|burst| evaluate_burst(burst, window_size, acceptor).map(|(result, _)| result))
        .collect()
}

/// Binned curve of pooled sub-burst standard deviations.
pub fn binned_bva(stream: &PhotonStream, params: &AnalysisParams) -> Result<BvaCurve> {
    Ok(analyze(stream, params)?.pooled)
}

/// Full analysis in a single pass over the bursts.
pub fn analyze(stream: &PhotonStream, params: &AnalysisParams) -> Result<BvaAnalysis> {
    log_start(stream, params);
    Ok(accumulate(stream.iter(), params)?.finish(params))
}

/// Full analysis with the bursts split across `shards` scoped threads.
pub fn analyze_sharded(
    stream: &PhotonStream,
    params: &AnalysisParams,
    shards: usize,
) -> Result<BvaAnalysis> {
    let bursts: Vec<&Burst> = stream.iter().collect();
    let shards = shards.clamp(1, bursts.len().max(1));
    if shards == 1 {
        return analyze(stream, params);
    }
    log_start(stream, params);

    let chunk = bursts.len().div_ceil(shards);
    let partials: Vec<Result<PartialAnalysis>> = thread::scope(|s| {
        let handles: Vec<_> = bursts
            .chunks(chunk)
            .map(|part| s.spawn(move || accumulate(part.iter().copied(), params)))
            .collect();

        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    error!("analysis shard panicked");
                    Err(Error::Internal("analysis shard panicked".to_string()))
                })
            })
            .collect()
    });

    let mut combined = PartialAnalysis::new(params.edges.num_bins());
    for partial in partials {
        combined.merge(partial?)?;
    }
    Ok(combined.finish(params))
}

fn log_start(stream: &PhotonStream, params: &AnalysisParams) {
    if let Some(gap) = coverage_gap(params.edges.as_slice()) {
        warn!(gap = %gap, "bin edges do not cover [0, 1]");
    }
    debug!(
        bursts = stream.num_bursts(),
        photons = stream.num_photons(),
        window_size = params.window_size,
        bins = params.edges.num_bins(),
        threshold = params.threshold,
        policy = %params.boundary_policy,
        "starting analysis"
    );
}
