use anyhow::{Context, Result};
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use gaitcycle::GaitAnalysis;
use gaitcycle::config::{AnalysisConfig, LegSelection};
use gaitcycle::gait::{TimeNormalizedCoordinates, available_scalars};
use gaitcycle::output::{OutputFormat, TrialReport, create_formatter};

#[derive(Parser, Debug)]
#[command(name = "gaitcycle")]
#[command(about = "Segment walking trials into gait cycles and compute gait metrics", long_about = None)]
struct Args {
    /// Session directory containing MarkerData/ and OpenSimData/Kinematics/
    session: PathBuf,

    /// Trial names to analyze
    #[arg(required = true)]
    trials: Vec<String>,

    /// Ipsilateral leg: auto, left, right
    #[arg(short, long, value_enum)]
    leg: Option<LegSelection>,

    /// Low-pass cutoff in Hz for markers and kinematics (<= 0 disables)
    #[arg(long)]
    cutoff: Option<f64>,

    /// Number of gait cycles to analyze, most recent first
    #[arg(short = 'n', long)]
    cycles: Option<usize>,

    /// Comma-separated scalar names; omit to list the available scalars
    #[arg(short, long, value_delimiter = ',')]
    scalars: Option<Vec<String>>,

    /// TOML analysis configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the mean time-normalized coordinates of each trial as CSV
    /// (`<dir>/<trial>_normalized.csv`)
    #[arg(long)]
    normalized: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_values(values: &[f64]) -> Option<Self> {
        let mut stats: Stats<f64> = Stats::new();
        for &v in values.iter().filter(|v| v.is_finite()) {
            stats.update(v);
        }
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match args.config {
        Some(ref path) => AnalysisConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(leg) = args.leg {
        config.leg = leg;
    }
    if let Some(cutoff) = args.cutoff {
        config.filter.cutoff_hz = cutoff;
    }
    if let Some(cycles) = args.cycles {
        config.gait_cycles = cycles;
    }
    config.validate()?;
    Ok(config)
}

fn write_normalized_csv(path: &Path, normalized: &TimeNormalizedCoordinates) -> Result<()> {
    let mean = &normalized.mean;
    let mut out = String::from("percent");
    for name in mean.names() {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');
    for (row, percent) in normalized.percent.iter().enumerate() {
        out.push_str(&format!("{}", percent));
        for value in mean.row(row) {
            out.push_str(&format!(",{:.6}", value));
        }
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

fn analyze_trial(args: &Args, config: &AnalysisConfig, trial: &str, names: &[&str]) -> Result<TrialReport> {
    let analysis = GaitAnalysis::from_session(&args.session, trial, config)
        .with_context(|| format!("Failed to analyze trial {}", trial))?;
    let report = TrialReport::new(trial, &analysis, names)?;

    for (name, value) in &report.scalars {
        if let Some(summary) = StatsSummary::from_values(&value.per_cycle) {
            log::info!(
                "{} {}: mean {:.3}, std {:.3}, range {:.3}..{:.3} over {} cycle(s)",
                trial,
                name,
                summary.mean,
                summary.std_dev,
                summary.min,
                summary.max,
                summary.count
            );
        }
    }

    if let Some(ref dir) = args.normalized {
        fs::create_dir_all(dir).context("Failed to create normalized output directory")?;
        let normalized = analysis.coordinates_time_normalized()?;
        write_normalized_csv(&dir.join(format!("{}_normalized.csv", trial)), &normalized)?;
    }
    Ok(report)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let Some(ref requested) = args.scalars else {
        println!("Available scalars: {}", available_scalars().join(", "));
        return Ok(());
    };
    let names: Vec<&str> = requested.iter().map(|s| s.trim()).collect();
    let config = build_config(&args)?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut failures = 0;
    for trial in &args.trials {
        match analyze_trial(&args, &config, trial, &names) {
            Ok(report) => println!("{}", formatter.format(&report)),
            Err(e) => {
                failures += 1;
                eprintln!("{}: {:#}", trial, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} trial(s) failed", failures, args.trials.len());
    }
    Ok(())
}
