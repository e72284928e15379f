//! `fa-realtime`: train function approximators on synthetic data and check that
//! their per-sample prediction path never allocates.
//!
//! ```text
//! fa-realtime [OUTPUT_DIR] [APPROXIMATOR...] [--dims 1,2] [--target standard] [--warn-only] [-v]
//! ```
//!
//! An empty `OUTPUT_DIR` (`""`) disables saving models.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::{OsStringValueParser, TypedValueParser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fnapprox::prelude::*;

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

#[derive(Debug, Parser)]
#[command(name = "fa-realtime", version, about)]
struct Cli {
    /// Directory to save trained models in ("" disables saving).
    #[arg(value_parser = OsStringValueParser::new().map(PathBuf::from))]
    directory: Option<PathBuf>,

    /// Approximators to benchmark (default: LWR RRRFF LWPR GMR).
    approximators: Vec<String>,

    /// Input dimensionalities, comma separated.
    #[arg(long, value_delimiter = ',', default_value = "1,2")]
    dims: Vec<usize>,

    /// Target function: `standard` or `sum-of-sines`.
    #[arg(long, default_value_t = TargetFunction::Standard)]
    target: TargetFunction,

    /// Warn about allocations in the real-time loop instead of failing.
    #[arg(long)]
    warn_only: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

impl Cli {
    fn into_config(self) -> BenchmarkConfig {
        let policy = if self.warn_only {
            RealtimePolicy::Warn
        } else {
            RealtimePolicy::Strict
        };
        let config = BenchmarkConfig::new()
            .approximators(self.approximators)
            .dims(self.dims)
            .target(self.target)
            .policy(policy);
        match self.directory {
            Some(directory) => config.directory(directory),
            None => config,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = cli.into_config();
    info!(?config, "starting benchmark");

    let reports = BenchmarkRunner::new(config)
        .run_with_progress(
            |name, input_dim| {
                print!("{}", training_heading(name, input_dim));
                let _ = io::stdout().flush();
            },
            |report| println!("{report:#}"),
        )
        .context("benchmark failed")?;

    info!(runs = reports.len(), "benchmark finished");
    Ok(())
}
