use anyhow::{Context, Result};
use clap::Parser;
use gaitcycle::loader::save_trial;
use gaitcycle::simulation::{MarkerNoiseConfig, WalkingTrialConfig, generate_walking_trial};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_trial")]
#[command(about = "Generate synthetic walking trials in the session layout read by gaitcycle")]
struct Args {
    /// TOML walking-trial configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session directory to write
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Number of trials to generate
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Trial name prefix
    #[arg(long, default_value = "walk")]
    prefix: String,

    /// Trial duration in seconds (overrides config)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Walking speed in m/s (overrides config)
    #[arg(long)]
    gait_speed: Option<f64>,

    /// Treadmill belt speed in m/s (overrides config)
    #[arg(long)]
    belt_speed: Option<f64>,

    /// Step width in m (overrides config)
    #[arg(long)]
    step_width: Option<f64>,

    /// Marker noise standard deviation in m (overrides config)
    #[arg(long)]
    noise: Option<f64>,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    trial: String,
    seed: Option<u64>,
    gait_speed: f64,
    belt_speed: f64,
    step_width: f64,
    stride_length: f64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: f64,
    duration_secs: f64,
    cycle_period_secs: f64,
    trials: Vec<ManifestEntry>,
}

fn load_toml_config(path: &PathBuf) -> Result<WalkingTrialConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_trial_config(base: &WalkingTrialConfig, args: &Args, seed: Option<u64>) -> WalkingTrialConfig {
    let mut config = base.clone();
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    if let Some(speed) = args.gait_speed {
        config.gait_speed = speed;
    }
    if let Some(speed) = args.belt_speed {
        config.belt_speed = speed;
    }
    if let Some(width) = args.step_width {
        config.step_width = width;
    }
    if let Some(std_dev) = args.noise {
        config.noise = Some(MarkerNoiseConfig::new(std_dev));
    }
    if let (Some(noise), Some(seed)) = (config.noise.as_mut(), seed) {
        noise.seed = Some(seed);
    }
    config
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

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let base_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        WalkingTrialConfig::default()
    };

    let mut manifest_entries = Vec::new();
    for trial in 0..args.trials {
        let seed = args.seed.map(|s| s + trial as u64);
        let config = build_trial_config(&base_config, &args, seed);
        let name = format!("{}_{:02}", args.prefix, trial);

        let synthetic = generate_walking_trial(&config)
            .with_context(|| format!("Failed to generate trial {}", name))?;
        save_trial(&args.output_dir, &name, &synthetic.markers, &synthetic.kinematics)
            .with_context(|| format!("Failed to write trial {}", name))?;

        manifest_entries.push(ManifestEntry {
            trial: name,
            seed,
            gait_speed: config.gait_speed,
            belt_speed: config.belt_speed,
            step_width: config.step_width,
            stride_length: config.gait_speed * config.cycle_period_secs,
        });
        eprint!("\rGenerating: {}/{}", trial + 1, args.trials);
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: base_config.sample_rate,
            duration_secs: args.duration.unwrap_or(base_config.duration_secs),
            cycle_period_secs: base_config.cycle_period_secs,
            trials: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} trials in {}",
        args.trials,
        args.output_dir.display()
    );
    Ok(())
}
