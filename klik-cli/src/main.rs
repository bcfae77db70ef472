//! Klik CLI: evaluate, advise, scan, and synthetic data commands.
//!
//! Commands:
//! - `evaluate`: run the signal pipeline once for a symbol
//! - `advise`: grade a proposed trade and print its ladder
//! - `scan`: poll a symbol list and print every emitted signal
//! - `synthetic`: write deterministic synthetic candles to CSV

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use klik_core::{Direction, SignalConfig, SignalEngine, TradeAdvisor};
use klik_runner::{
    write_csv, CandleSource, CsvSource, Scanner, ScannerConfig, SyntheticSource,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "klik", about = "Klik CLI: scored trade signals from OHLCV candles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where candles come from. Exactly one must be given.
#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Directory of `<SYMBOL>.csv` files.
    #[arg(long, conflicts_with = "synthetic")]
    csv_dir: Option<PathBuf>,

    /// Use deterministic synthetic candles.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Candles to fetch per symbol.
    #[arg(long, default_value_t = 300)]
    limit: usize,

    /// Path to a TOML signal config. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one symbol and print the signal as JSON.
    Evaluate {
        #[arg(long)]
        symbol: String,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Grade a proposed trade and print the idea as JSON.
    Advise {
        #[arg(long)]
        symbol: String,

        #[arg(long, value_enum)]
        direction: DirectionArg,

        /// Proposed entry price.
        #[arg(long)]
        entry: f64,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Scan symbols repeatedly and print each emitted signal.
    Scan {
        /// Comma-separated symbols (e.g., BTCUSDT,ETHUSDT).
        #[arg(long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        /// Stop after this many passes. Runs until killed when omitted.
        #[arg(long)]
        iterations: Option<usize>,

        /// Seconds between passes.
        #[arg(long, default_value_t = 20)]
        interval_secs: u64,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write synthetic candles for a symbol to a CSV file.
    Synthetic {
        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = 300)]
        bars: usize,

        /// Minutes between candles.
        #[arg(long, default_value_t = 15)]
        interval_minutes: i64,

        /// Timestamp of the last candle (RFC 3339). Fixed default when omitted.
        #[arg(long)]
        end: Option<DateTime<Utc>>,

        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Long,
    Short,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Long => Direction::Long,
            DirectionArg::Short => Direction::Short,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { symbol, source } => run_evaluate(&symbol, &source),
        Commands::Advise {
            symbol,
            direction,
            entry,
            source,
        } => run_advise(&symbol, direction.into(), entry, &source),
        Commands::Scan {
            symbols,
            iterations,
            interval_secs,
            source,
        } => run_scan(symbols, iterations, interval_secs, &source),
        Commands::Synthetic {
            symbol,
            bars,
            interval_minutes,
            end,
            out,
        } => run_synthetic(&symbol, bars, interval_minutes, end, &out),
    }
}

fn build_source(args: &SourceArgs) -> Result<Box<dyn CandleSource>> {
    match (&args.csv_dir, args.synthetic) {
        (Some(dir), false) => Ok(Box::new(CsvSource::new(dir.clone()))),
        (None, true) => Ok(Box::new(SyntheticSource::default())),
        (Some(_), true) => bail!("--csv-dir and --synthetic are mutually exclusive"),
        (None, false) => bail!("one of --csv-dir or --synthetic is required"),
    }
}

fn load_config(path: Option<&Path>) -> Result<SignalConfig> {
    let config = match path {
        Some(path) => SignalConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SignalConfig::default(),
    };
    log::debug!("config hash {}", config.config_hash()?);
    Ok(config)
}

fn run_evaluate(symbol: &str, args: &SourceArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let candles = build_source(args)?.fetch(symbol, args.limit)?;
    match SignalEngine::new(config).evaluate(symbol, &candles)? {
        Some(signal) => {
            println!("{}", serde_json::to_string_pretty(&signal)?);
            log::info!("fingerprint {}", signal.fingerprint());
        }
        None => println!("no signal"),
    }
    Ok(())
}

fn run_advise(symbol: &str, direction: Direction, entry: f64, args: &SourceArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let candles = build_source(args)?.fetch(symbol, args.limit)?;
    let idea = TradeAdvisor::new(config).advise(symbol, direction, entry, &candles)?;
    println!("{}", serde_json::to_string_pretty(&idea)?);
    Ok(())
}

fn run_scan(
    symbols: Vec<String>,
    iterations: Option<usize>,
    interval_secs: u64,
    args: &SourceArgs,
) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let scanner = Scanner::new(
        build_source(args)?,
        config,
        ScannerConfig {
            limit: args.limit,
            interval: Duration::from_secs(interval_secs),
            max_iterations: iterations,
        },
    );

    log::info!(
        "scanning {} symbols, threshold {:.0}",
        symbols.len(),
        scanner.engine().config().confidence_threshold
    );

    let cancel = AtomicBool::new(false);
    let summary = scanner.run(&symbols, &cancel, |outcome| {
        if let Some(signal) = outcome.signal() {
            match serde_json::to_string(signal) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("{}: failed to encode signal: {e}", outcome.symbol),
            }
        }
    });

    println!(
        "passes: {}  signals: {}  failures: {}",
        summary.iterations, summary.signals, summary.failures
    );
    Ok(())
}

fn run_synthetic(
    symbol: &str,
    bars: usize,
    interval_minutes: i64,
    end: Option<DateTime<Utc>>,
    out: &Path,
) -> Result<()> {
    if interval_minutes <= 0 {
        bail!("--interval-minutes must be > 0, got {interval_minutes}");
    }
    let mut source =
        SyntheticSource::default().with_interval(chrono::Duration::minutes(interval_minutes));
    if let Some(end) = end {
        source = source.with_end(end);
    }
    let candles = source.fetch(symbol, bars)?;
    write_csv(out, &candles)?;
    println!("Wrote {} candles to {}", candles.len(), out.display());
    Ok(())
}
