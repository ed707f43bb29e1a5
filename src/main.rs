// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Command line front end: recover an LFSR113 state from observed ports,
//! simulate a host handing out ports, or run recovery trials.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, warn, LevelFilter};
use rand::{Rng, SeedableRng};

use dephemeral::config::Config;
use dephemeral::error::ConfigError;
use dephemeral::solver::{predict_next, recover_state, replay};
use dephemeral::testdata::trial::{PORT_RANGES, STATIC_TEST_SEEDS};
use dephemeral::{strings, trials, Lfsr113, PortRange, State};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with range and output settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recover the generator state from successive ports and predict the next ones
    Recover {
        /// Low end of the ephemeral port range (inclusive)
        #[arg(long)]
        low: Option<u32>,

        /// High end of the ephemeral port range (inclusive)
        #[arg(long)]
        high: Option<u32>,

        /// Number of future ports to predict
        #[arg(short, long)]
        predict: Option<usize>,

        /// Observed ports, oldest first
        #[arg(required = true)]
        samples: Vec<u32>,
    },
    /// Print ports a host seeded with LFSR113 would hand out
    Simulate {
        /// Expand a 64-bit seed into the generator state
        #[arg(long, conflicts_with = "state")]
        seed: Option<u64>,

        /// Explicit state as four hex words, e.g. "0x12345678 0x9abcdef0 0x0fedcba9 0x87654321"
        #[arg(long)]
        state: Option<State>,

        /// Number of ports to print
        #[arg(short = 'n', long)]
        count: Option<usize>,

        #[arg(long)]
        low: Option<u32>,

        #[arg(long)]
        high: Option<u32>,
    },
    /// Run recovery trials over fixed and random seeds
    Trials {
        /// Random seeds to try after the fixed ones
        #[arg(short = 'n', long, default_value_t = 16)]
        random: usize,

        /// File the report is appended to
        #[arg(short, long, default_value = "rslt.txt")]
        output: String,

        /// Only test this range instead of the built-in list
        #[arg(long, requires = "high")]
        low: Option<u32>,

        #[arg(long, requires = "low")]
        high: Option<u32>,
    },
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let config = Config::from_file(path)?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn resolve_range(
    config: &Config,
    low: Option<u32>,
    high: Option<u32>,
) -> dephemeral::Result<PortRange> {
    PortRange::new(low.unwrap_or(config.low), high.unwrap_or(config.high))
}

fn format_ports(ports: &[u32]) -> String {
    ports
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

fn run_recover(config: &Config, range: &PortRange, samples: &[u32], predictions: usize) -> ExitCode {
    if samples.len() > config.max_samples {
        warn!(
            "{} samples given, more than the configured maximum of {}",
            samples.len(),
            config.max_samples
        );
    }
    let state = match recover_state(samples, range) {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Recovered state:");
    for (name, word) in strings::STATE_NAMES.iter().zip(state.0) {
        println!("  {} = {:#010x}", name, word);
    }
    println!(
        "Replayed ports:  {}",
        format_ports(&replay(&state, range, samples.len()))
    );
    println!(
        "Predicted ports: {}",
        format_ports(&predict_next(&state, samples.len(), range, predictions))
    );
    ExitCode::SUCCESS
}

fn run_simulate(state: State, range: &PortRange, count: usize) -> ExitCode {
    info!("Simulating host with state {}", state);
    println!("{}", format_ports(&replay(&state, range, count)));
    ExitCode::SUCCESS
}

fn run_trials(config: &Config, ranges: &[PortRange], random: usize, output: &str) -> ExitCode {
    let mut rng = rand::rng();
    let seeds: Vec<u64> = STATIC_TEST_SEEDS
        .iter()
        .copied()
        .chain((0..random).map(|_| rng.random::<u64>()))
        .collect();
    let mut all_passed = true;
    for range in ranges {
        match trials::trial_suite(
            &seeds,
            range,
            config.max_samples,
            config.predictions,
            output,
        ) {
            Ok(results) => all_passed &= results.iter().all(|r| r.passed()),
            Err(e) => {
                error!("Failed to write report to {}: {}", output, e);
                return ExitCode::FAILURE;
            }
        }
    }
    if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Recover {
            low,
            high,
            predict,
            samples,
        } => resolve_range(&config, low, high).map(|range| {
            run_recover(
                &config,
                &range,
                &samples,
                predict.unwrap_or(config.predictions),
            )
        }),
        Commands::Simulate {
            seed,
            state,
            count,
            low,
            high,
        } => resolve_range(&config, low, high).map(|range| {
            let state = state.unwrap_or_else(|| {
                Lfsr113::seed_from_u64(seed.unwrap_or_else(rand::random)).state()
            });
            run_simulate(state, &range, count.unwrap_or(config.max_samples))
        }),
        Commands::Trials {
            random,
            output,
            low,
            high,
        } => {
            let ranges = match (low, high) {
                (Some(low), Some(high)) => PortRange::new(low, high).map(|r| vec![r]),
                _ => PORT_RANGES
                    .iter()
                    .map(|&(low, high)| PortRange::new(low, high))
                    .collect(),
            };
            ranges.map(|ranges| run_trials(&config, &ranges, random, &output))
        }
    };

    result.unwrap_or_else(|e| {
        error!("{}", e);
        ExitCode::FAILURE
    })
}
