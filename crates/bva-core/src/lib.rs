//! Burst variance analysis core library.
//!
//! Pipeline, in order:
//! - [`stream`]: photons grouped by burst
//! - [`segment`]: fixed-size sub-burst windows and their acceptor ratios
//! - [`efficiency`]: raw FRET efficiency of a burst
//! - [`dispersion`]: per-burst standard deviation of the window ratios
//! - [`binning`]: raw-efficiency bin classification
//! - [`aggregate`]: per-bin accumulation and the thresholded curves
//! - [`analysis`]: the driver tying the stages together
//!
//! Plus photon-table input, report rendering, logging and exit codes for
//! the `bva` binary in `main.rs`.

pub mod aggregate;
pub mod analysis;
pub mod binning;
pub mod dispersion;
pub mod efficiency;
pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod output;
pub mod segment;
pub mod stream;

pub use aggregate::{
    AggregationMode, BinAccumulator, BinAccumulators, BvaCurve, CurvePoint, SENTINEL,
};
pub use analysis::{
    accumulate, analyze, analyze_sharded, binned_bva, per_burst_bva, AnalysisParams, BurstBva,
    BvaAnalysis, PartialAnalysis,
};
pub use binning::{BinEdges, Placement};
pub use stream::{Burst, PhotonStream};
