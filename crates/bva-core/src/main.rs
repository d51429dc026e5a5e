//! bva - burst variance analysis for smFRET burst photon tables.
//!
//! Reads a burst-segmented photon table, computes per-burst sub-burst
//! dispersion and the binned BVA curve, and writes a report to stdout.

use bva_common::error::format_error_human;
use bva_common::{Error, OutputFormat, Result, StructuredError, SCHEMA_VERSION};
use bva_config::validate::{coverage_gap, validate_config};
use bva_config::{list_presets, load_config, BoundaryPolicy, LoadedConfig, PresetName};
use bva_core::analysis::{analyze_sharded, per_burst_bva, AnalysisParams};
use bva_core::exit_codes::ExitCode;
use bva_core::input::{read_photon_table, InputFormat};
use bva_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use bva_core::output::{render, BvaReport, InputProvenance};
use clap::{Args, Parser, Subcommand};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing::info;

/// Burst variance analysis of smFRET bursts
#[derive(Parser)]
#[command(name = "bva")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photon table
    Analyze(AnalyzeArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// List built-in presets
    Presets,

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Photon table (CSV or JSON Lines)
    input: PathBuf,

    /// Config file (overrides BVA_CONFIG and the XDG location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a built-in preset instead of a config file
    #[arg(long, conflicts_with = "config")]
    preset: Option<PresetName>,

    /// Photons per sub-burst window
    #[arg(long, short = 'n')]
    window_size: Option<usize>,

    /// Minimum sample count (exclusive) for a bin to be reported
    #[arg(long, short = 't')]
    threshold: Option<u64>,

    /// Handling of bursts outside the bin range (exclude, clamp, strict)
    #[arg(long)]
    boundary: Option<BoundaryPolicy>,

    /// Only compute per-burst dispersion, skip binning
    #[arg(long)]
    per_burst_only: bool,

    /// Input format (default: from the file extension)
    #[arg(long, value_enum)]
    input_format: Option<InputFormat>,

    /// Worker threads for the binned analysis
    #[arg(long, short = 'j', default_value_t = 1)]
    jobs: usize,

    /// Write the report here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Show a preset instead of the resolved file
        #[arg(long)]
        preset: Option<PresetName>,
    },
    /// Validate a configuration file
    Validate {
        /// Config file (default: resolved location)
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let result = match &cli.command {
        Commands::Analyze(args) => run_analyze(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Presets => run_presets(&cli.global),
        Commands::Version => {
            print_version(&cli.global);
            Ok(())
        }
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Clean,
        Err(err) => report_error(&cli.global, &err),
    };
    std::process::exit(exit_code.as_i32());
}

fn report_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    let exit_code = ExitCode::from_error(err);
    match global.format {
        OutputFormat::Json => {
            let structured =
                StructuredError::from(err).with_context("exit_code", exit_code.code_name());
            eprintln!("{}", structured.to_json());
        }
        OutputFormat::Summary => eprintln!("bva: error {}: {}", err.code(), err),
        OutputFormat::Md => {
            eprintln!("{}", format_error_human(err, std::io::stderr().is_terminal()))
        }
    }
    exit_code
}

fn emit(text: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            writeln!(file, "{}", text)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text)?;
        }
    }
    Ok(())
}

/// Load the config and fold in command-line overrides.
fn resolve_analysis_config(args: &AnalyzeArgs) -> Result<LoadedConfig> {
    let mut loaded = load_config(args.config.as_deref(), args.preset)?;
    let config = &mut loaded.config;
    if let Some(n) = args.window_size {
        config.window_size = n;
    }
    if let Some(t) = args.threshold {
        config.threshold = t;
    }
    if let Some(policy) = args.boundary {
        config.boundary_policy = policy;
    }
    validate_config(config)?;
    Ok(loaded)
}

fn run_analyze(global: &GlobalOpts, args: &AnalyzeArgs) -> Result<()> {
    let run_id = generate_run_id();
    let loaded = resolve_analysis_config(args)?;
    let params = AnalysisParams::from_config(&loaded.config)?;
    info!(
        run_id = %run_id,
        input = %args.input.display(),
        config_source = %loaded.source,
        window_size = params.window_size,
        threshold = params.threshold,
        "analysis started"
    );

    let table = read_photon_table(&args.input, args.input_format)?;
    let provenance = InputProvenance::from(&table);
    let stream = table.into_stream()?;

    let report = if args.per_burst_only {
        let bursts = per_burst_bva(&stream, params.window_size, params.acceptor)?;
        BvaReport::per_burst_only(&run_id, &loaded, provenance, bursts)
    } else {
        let analysis = analyze_sharded(&stream, &params, args.jobs)?;
        BvaReport::from_analysis(&run_id, &loaded, provenance, analysis)
    };

    info!(
        run_id = %run_id,
        bursts = report.summary.num_bursts,
        reported_bins = report.summary.reported_bins,
        excluded = report.summary.excluded_bursts,
        "analysis finished"
    );
    emit(&render(&report, global.format)?, args.output.as_ref())
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Show { preset } => {
            let loaded = load_config(None, *preset)?;
            print_config(global, &loaded, "show")
        }
        ConfigCommands::Validate { path } => {
            let loaded = load_config(path.as_deref(), None)?;
            print_config(global, &loaded, "validate")
        }
    }
}

fn print_config(global: &GlobalOpts, loaded: &LoadedConfig, action: &str) -> Result<()> {
    let edges = loaded.config.bin_edges()?;
    let warning = coverage_gap(&edges);
    let text = match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "valid",
                "source": loaded.source.to_string(),
                "path": loaded.path.as_ref().map(|p| p.display().to_string()),
                "num_bins": edges.len() - 1,
                "warning": warning,
                "config": &loaded.config,
            });
            serde_json::to_string_pretty(&response)?
        }
        OutputFormat::Summary => format!(
            "config {}: OK ({}, n={}, T={}, {} bins)",
            action,
            loaded.source,
            loaded.config.window_size,
            loaded.config.threshold,
            edges.len() - 1
        ),
        OutputFormat::Md => {
            let mut lines = vec![
                "# Configuration".to_string(),
                String::new(),
                format!("Source: {}", loaded.source),
            ];
            if let Some(path) = &loaded.path {
                lines.push(format!("Path: {}", path.display()));
            }
            lines.push(format!("Window size: {}", loaded.config.window_size));
            lines.push(format!("Threshold: {}", loaded.config.threshold));
            lines.push(format!(
                "Bins: {} over [{}, {}]",
                edges.len() - 1,
                edges[0],
                edges[edges.len() - 1]
            ));
            lines.push(format!("Boundary policy: {}", loaded.config.boundary_policy));
            lines.push(format!("Acceptor stream: {}", loaded.config.acceptor));
            if let Some(w) = &warning {
                lines.push(format!("Warning: {}", w));
            }
            lines.join("\n")
        }
    };
    emit(&text, None)
}

fn run_presets(global: &GlobalOpts) -> Result<()> {
    let presets = list_presets();
    let text = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "presets": presets,
        }))?,
        OutputFormat::Summary => presets
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        OutputFormat::Md => {
            let mut lines = vec![
                "| Preset | n | T | Bins | Description |".to_string(),
                "|---|---:|---:|---:|---|".to_string(),
            ];
            for p in &presets {
                lines.push(format!(
                    "| {} | {} | {} | {} | {} |",
                    p.name, p.window_size, p.threshold, p.num_bins, p.description
                ));
            }
            lines.join("\n")
        }
    };
    emit(&text, None)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "bva_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", version_info);
        }
        _ => {
            println!("bva {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
