use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tyre_strategy::config::{RaceConfig, RaceFile};
use tyre_strategy::data::{lap_records, write_trace};
use tyre_strategy::model::PaceModel;
use tyre_strategy::report::{print_best, print_leaderboard};
use tyre_strategy::rng::SeededRandom;
use tyre_strategy::search::search_strategies;
use tyre_strategy::Weather;

#[derive(Debug, Parser)]
#[command(version, about = "Finds the fastest tyre strategy for a race", long_about = None)]
struct Args {
    /// JSON race file; flags given on the command line win over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total number of laps
    #[arg(short, long)]
    laps: Option<u32>,

    /// Pit stop time in seconds
    #[arg(short, long)]
    pit_stop: Option<f64>,

    /// Dry, Intermediate or Wet
    #[arg(short, long)]
    weather: Option<Weather>,

    /// Soft tyre lap time in seconds
    #[arg(short, long)]
    base_lap: Option<f64>,

    /// Track degradation multiplier (1.0 normal, above 1.0 harsher)
    #[arg(short, long)]
    degradation: Option<f64>,

    /// Laps under virtual safety car, comma separated
    #[arg(long, value_delimiter = ',')]
    vsc: Vec<u32>,

    /// Laps under safety car, comma separated
    #[arg(long, value_delimiter = ',')]
    sc: Vec<u32>,

    /// Red flag laps, comma separated
    #[arg(long, value_delimiter = ',')]
    red: Vec<u32>,

    /// Seed for the lap noise; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the best strategy's lap trace as CSV instead of the report
    #[arg(long)]
    trace: bool,
}

fn build_config(args: &Args) -> Result<RaceConfig> {
    let mut builder = RaceConfig::builder();
    if let Some(path) = &args.config {
        builder = RaceFile::load(path)
            .and_then(|file| file.apply(builder))
            .with_context(|| format!("failed to load race file {}", path.display()))?;
    }

    if let Some(laps) = args.laps {
        builder = builder.total_laps(laps);
    }
    if let Some(pit) = args.pit_stop {
        builder = builder.pit_stop_time(pit);
    }
    if let Some(weather) = args.weather {
        builder = builder.weather(weather);
    }
    if let Some(base) = args.base_lap {
        builder = builder.baseline_soft_lap_time(base);
    }
    if let Some(mult) = args.degradation {
        builder = builder.track_degradation_multiplier(mult);
    }
    if !args.vsc.is_empty() {
        builder = builder.vsc_laps(args.vsc.clone());
    }
    if !args.sc.is_empty() {
        builder = builder.sc_laps(args.sc.clone());
    }
    if !args.red.is_empty() {
        builder = builder.red_laps(args.red.clone());
    }

    builder.build().context("invalid race settings")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let mut rng = args.seed.map_or_else(SeededRandom::unseeded, SeededRandom::new);
    info!(seed = rng.seed(), "simulating best strategies");

    let outcome = search_strategies(&config, &mut rng)?;
    let best = outcome.best();
    let table = config.tyre_table();
    let records = lap_records(&best.strategy, &best.result, &table);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.trace {
        write_trace(&mut out, &records).context("failed to write lap trace")?;
        return Ok(());
    }

    let pace = PaceModel::new(&records).stints();
    print_leaderboard(&mut out, &outcome)?;
    print_best(&mut out, &outcome, &pace)?;
    Ok(())
}
