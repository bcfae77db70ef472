//! Candle sources: where the scanner gets its input.
//!
//! The core pipeline never fetches anything itself. A host hands it candles
//! from one of these sources (or its own implementation of [`CandleSource`]).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use klik_core::Candle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid symbol name '{symbol}'")]
    InvalidSymbol { symbol: String },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can produce the trailing `limit` candles for a symbol.
///
/// Implementations must be shareable across threads: the scanner fetches
/// symbols in parallel.
pub trait CandleSource: Send + Sync {
    fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, SourceError>;
}

impl<T: CandleSource + ?Sized> CandleSource for Box<T> {
    fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, SourceError> {
        (**self).fetch(symbol, limit)
    }
}

/// Symbols become file names, so only a conservative character set passes.
fn check_symbol(symbol: &str) -> Result<(), SourceError> {
    let ok = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !symbol.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(SourceError::InvalidSymbol {
            symbol: symbol.to_string(),
        })
    }
}

/// Reads `<dir>/<SYMBOL>.csv` with header `timestamp,open,high,low,close,volume`.
/// Timestamps are RFC 3339.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl CandleSource for CsvSource {
    fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, SourceError> {
        check_symbol(symbol)?;
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(SourceError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let mut candles = read_csv(&path)?;
        let skip = candles.len().saturating_sub(limit);
        candles.drain(..skip);
        log::debug!("{symbol}: read {} candles from {}", candles.len(), path.display());
        Ok(candles)
    }
}

pub fn read_csv(path: &Path) -> Result<Vec<Candle>, SourceError> {
    let csv_err = |source| SourceError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize::<Candle>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)
}

pub fn write_csv(path: &Path, candles: &[Candle]) -> Result<(), SourceError> {
    let csv_err = |source| SourceError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for candle in candles {
        writer.serialize(candle).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Deterministic random-walk candles, seeded from the symbol name.
///
/// The last candle always lands on `end`, so output never depends on the
/// wall clock. These are clearly fake and meant for demos and tests.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    interval: Duration,
    end: DateTime<Utc>,
    start_price: f64,
    /// Max absolute per-bar return.
    step: f64,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            interval: Duration::minutes(15),
            end: Utc
                .with_ymd_and_hms(2024, 6, 3, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            start_price: 100.0,
            step: 0.006,
        }
    }
}

impl SyntheticSource {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = end;
        self
    }

    pub fn generate(&self, symbol: &str, count: usize) -> Vec<Candle> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut price = self.start_price;
        (0..count)
            .map(|i| {
                let ret: f64 = rng.gen_range(-self.step..self.step);
                let open = price;
                let close = price * (1.0 + ret);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..self.step / 2.0));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..self.step / 2.0));
                let volume = rng.gen_range(500.0..5_000.0);
                price = close;

                let bars_before_end = (count - 1 - i) as i32;
                Candle::new(self.end - self.interval * bars_before_end, open, high, low, close, volume)
            })
            .collect()
    }
}

impl CandleSource for SyntheticSource {
    fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, SourceError> {
        check_symbol(symbol)?;
        Ok(self.generate(symbol, limit))
    }
}
