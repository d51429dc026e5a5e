//! Report envelope and renderers.
//!
//! stdout carries exactly one rendered report; logs go to stderr.

use crate::aggregate::{BvaCurve, CurvePoint};
use crate::analysis::{BurstBva, BvaAnalysis};
use crate::input::PhotonTable;
use bva_common::{OutputFormat, Result, SCHEMA_VERSION};
use bva_config::{AnalysisConfig, LoadedConfig};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Where the photon table came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputProvenance {
    pub path: PathBuf,
    pub format: String,
    pub sha256: String,
    pub rows: usize,
}

impl From<&PhotonTable> for InputProvenance {
    fn from(table: &PhotonTable) -> Self {
        InputProvenance {
            path: table.path.clone(),
            format: table.format.to_string(),
            sha256: table.sha256.clone(),
            rows: table.num_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub num_bursts: usize,
    pub num_photons: usize,
    pub excluded_bursts: usize,
    pub num_bins: usize,
    pub reported_bins: usize,
}

/// Complete output of one `bva analyze` run.
#[derive(Debug, Clone, Serialize)]
pub struct BvaReport {
    pub schema_version: String,
    pub generated_at: String,
    pub run_id: String,
    pub config: AnalysisConfig,
    pub config_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub input: InputProvenance,
    pub summary: ReportSummary,
    pub bursts: Vec<BurstBva>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pooled: Option<BvaCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst_mean: Option<BvaCurve>,
}

impl BvaReport {
    fn envelope(
        run_id: &str,
        loaded: &LoadedConfig,
        input: InputProvenance,
        summary: ReportSummary,
        bursts: Vec<BurstBva>,
    ) -> Self {
        BvaReport {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            run_id: run_id.to_string(),
            config: loaded.config.clone(),
            config_source: loaded.source.to_string(),
            config_path: loaded.path.clone(),
            input,
            summary,
            bursts,
            pooled: None,
            burst_mean: None,
        }
    }

    /// Report with per-burst results and both curves.
    pub fn from_analysis(
        run_id: &str,
        loaded: &LoadedConfig,
        input: InputProvenance,
        analysis: BvaAnalysis,
    ) -> Self {
        let summary = ReportSummary {
            num_bursts: analysis.bursts.len(),
            num_photons: analysis.num_photons,
            excluded_bursts: analysis.excluded_bursts,
            num_bins: analysis.pooled.points.len(),
            reported_bins: analysis.pooled.num_reported(),
        };
        let mut report = Self::envelope(run_id, loaded, input, summary, analysis.bursts);
        report.pooled = Some(analysis.pooled);
        report.burst_mean = Some(analysis.burst_mean);
        report
    }

    /// Report with per-burst results only.
    pub fn per_burst_only(
        run_id: &str,
        loaded: &LoadedConfig,
        input: InputProvenance,
        bursts: Vec<BurstBva>,
    ) -> Self {
        let summary = ReportSummary {
            num_bursts: bursts.len(),
            num_photons: bursts.iter().map(|b| b.size).sum(),
            excluded_bursts: 0,
            num_bins: 0,
            reported_bins: 0,
        };
        Self::envelope(run_id, loaded, input, summary, bursts)
    }
}

/// Render a report in the requested format.
pub fn render(report: &BvaReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Md => Ok(render_markdown(report)),
        OutputFormat::Summary => Ok(render_summary(report)),
    }
}

/// One-line status.
pub fn render_summary(report: &BvaReport) -> String {
    let s = &report.summary;
    let mut line = format!(
        "[{}] bva: {} bursts, {} photons, n={}",
        report.run_id, s.num_bursts, s.num_photons, report.config.window_size
    );
    if report.pooled.is_some() {
        let _ = write!(
            line,
            ", {}/{} bins reported (T={})",
            s.reported_bins, s.num_bins, report.config.threshold
        );
        if s.excluded_bursts > 0 {
            let _ = write!(line, ", {} excluded", s.excluded_bursts);
        }
    }
    line
}

fn fmt_value(point: &CurvePoint) -> String {
    if point.reported {
        format!("{:.4}", point.value)
    } else {
        "-".to_string()
    }
}

/// Markdown tables: the curves when present, otherwise per-burst results.
pub fn render_markdown(report: &BvaReport) -> String {
    let mut out = String::new();
    let s = &report.summary;
    let _ = writeln!(out, "# Burst variance analysis");
    let _ = writeln!(out);
    let _ = writeln!(out, "| | |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Run | `{}` |", report.run_id);
    let _ = writeln!(out, "| Input | `{}` ({}) |", report.input.path.display(), report.input.format);
    let _ = writeln!(out, "| SHA-256 | `{}` |", report.input.sha256);
    let _ = writeln!(out, "| Config | {} |", report.config_source);
    let _ = writeln!(out, "| Window size | {} |", report.config.window_size);
    let _ = writeln!(out, "| Threshold | {} |", report.config.threshold);
    let _ = writeln!(out, "| Bursts | {} |", s.num_bursts);
    let _ = writeln!(out, "| Photons | {} |", s.num_photons);

    match (&report.pooled, &report.burst_mean) {
        (Some(pooled), Some(burst_mean)) => {
            let _ = writeln!(out, "| Excluded bursts | {} |", s.excluded_bursts);
            let _ = writeln!(out);
            let _ = writeln!(out, "## Binned dispersion");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "| Bin | E range | Center | Pooled std | Burst mean | Bursts | Sub-bursts |"
            );
            let _ = writeln!(out, "|---:|---|---:|---:|---:|---:|---:|");
            for (p, m) in pooled.points.iter().zip(&burst_mean.points) {
                let _ = writeln!(
                    out,
                    "| {} | [{:.3}, {:.3}) | {:.3} | {} | {} | {} | {} |",
                    p.bin,
                    p.lower,
                    p.upper,
                    p.center,
                    fmt_value(p),
                    fmt_value(m),
                    p.num_bursts,
                    p.num_sub_bursts
                );
            }
        }
        _ => {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Per-burst dispersion");
            let _ = writeln!(out);
            let _ = writeln!(out, "| Burst | Size | Raw E | Sub-bursts | Std |");
            let _ = writeln!(out, "|---:|---:|---:|---:|---:|");
            for b in &report.bursts {
                let _ = writeln!(
                    out,
                    "| {} | {} | {:.4} | {} | {:.4} |",
                    b.burst, b.size, b.raw_efficiency, b.num_sub_bursts, b.bva
                );
            }
        }
    }
    out
}
