//! Polling scanner: evaluate a symbol list in parallel, repeatedly.
//!
//! Each pass fetches and evaluates every symbol on the rayon pool. A failing
//! symbol is logged and reported in its outcome; the rest of the batch still
//! runs. Cancellation is cooperative and checked between passes and while
//! sleeping, never in the middle of an evaluation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use klik_core::{Signal, SignalConfig, SignalEngine, SignalError};
use rayon::prelude::*;
use thiserror::Error;

use crate::source::{CandleSource, SourceError};

/// Longest single sleep before re-checking the cancel flag.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("evaluation failed: {0}")]
    Signal(#[from] SignalError),
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Candles requested per symbol.
    pub limit: usize,
    /// Pause between passes.
    pub interval: Duration,
    /// Stop after this many passes. `None` runs until cancelled.
    pub max_iterations: Option<usize>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            limit: 300,
            interval: Duration::from_secs(20),
            max_iterations: None,
        }
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub symbol: String,
    pub result: Result<Option<Signal>, ScanError>,
}

impl ScanOutcome {
    pub fn signal(&self) -> Option<&Signal> {
        self.result.as_ref().ok().and_then(Option::as_ref)
    }
}

/// Totals across every pass of [`Scanner::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub iterations: usize,
    pub signals: usize,
    pub failures: usize,
}

pub struct Scanner<S: CandleSource> {
    source: S,
    engine: SignalEngine,
    config: ScannerConfig,
}

impl<S: CandleSource> Scanner<S> {
    pub fn new(source: S, signal_config: SignalConfig, config: ScannerConfig) -> Self {
        Self {
            source,
            engine: SignalEngine::new(signal_config),
            config,
        }
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    fn scan_symbol(&self, symbol: &str) -> Result<Option<Signal>, ScanError> {
        let candles = self.source.fetch(symbol, self.config.limit)?;
        Ok(self.engine.evaluate(symbol, &candles)?)
    }

    /// One pass over `symbols`. Outcomes come back in input order.
    pub fn scan_once(&self, symbols: &[String]) -> Vec<ScanOutcome> {
        symbols
            .par_iter()
            .map(|symbol| {
                let result = self.scan_symbol(symbol);
                if let Err(e) = &result {
                    log::warn!("{symbol}: {e}");
                }
                ScanOutcome {
                    symbol: symbol.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Repeats [`scan_once`](Self::scan_once) until `cancel` is set or
    /// `max_iterations` passes have run.
    pub fn run<F>(&self, symbols: &[String], cancel: &AtomicBool, mut on_outcome: F) -> ScanSummary
    where
        F: FnMut(&ScanOutcome),
    {
        let mut summary = ScanSummary::default();
        loop {
            if cancel.load(Ordering::Relaxed) {
                log::info!("scan cancelled after {} passes", summary.iterations);
                break;
            }

            let started = Instant::now();
            let outcomes = self.scan_once(symbols);
            summary.iterations += 1;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(Some(_)) => summary.signals += 1,
                    Ok(None) => {}
                    Err(_) => summary.failures += 1,
                }
                on_outcome(outcome);
            }
            log::debug!(
                "pass {} over {} symbols took {:?}",
                summary.iterations,
                symbols.len(),
                started.elapsed()
            );

            if self
                .config
                .max_iterations
                .is_some_and(|max| summary.iterations >= max)
            {
                break;
            }
            if !sleep_unless_cancelled(self.config.interval, cancel) {
                log::info!("scan cancelled after {} passes", summary.iterations);
                break;
            }
        }
        summary
    }
}

/// Sleeps in short slices. Returns `false` if cancelled while waiting.
fn sleep_unless_cancelled(total: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticSource;
    use klik_core::Candle;

    /// Wraps the synthetic source but fails for one symbol.
    struct FlakySource {
        inner: SyntheticSource,
        broken: &'static str,
    }

    impl CandleSource for FlakySource {
        fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, SourceError> {
            if symbol == self.broken {
                return Err(SourceError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            self.inner.fetch(symbol, limit)
        }
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn quick_config(max_iterations: Option<usize>) -> ScannerConfig {
        ScannerConfig {
            limit: 250,
            interval: Duration::ZERO,
            max_iterations,
        }
    }

    #[test]
    fn one_failure_does_not_abort_batch() {
        let scanner = Scanner::new(
            FlakySource {
                inner: SyntheticSource::default(),
                broken: "BAD",
            },
            SignalConfig::default(),
            quick_config(Some(1)),
        );
        let outcomes = scanner.scan_once(&symbols(&["AAA", "BAD", "CCC"]));
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1].symbol, "BAD");
        assert!(matches!(outcomes[1].result, Err(ScanError::Source(_))));
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[2].result.is_ok());
    }

    #[test]
    fn short_history_is_reported_per_symbol() {
        let scanner = Scanner::new(
            SyntheticSource::default(),
            SignalConfig::default(),
            ScannerConfig {
                limit: 10,
                ..quick_config(Some(1))
            },
        );
        let outcomes = scanner.scan_once(&symbols(&["AAA"]));
        assert!(matches!(
            outcomes[0].result,
            Err(ScanError::Signal(SignalError::InsufficientHistory { .. }))
        ));
    }

    #[test]
    fn invalid_config_fails_every_symbol_without_panicking() {
        let scanner = Scanner::new(
            SyntheticSource::default(),
            SignalConfig {
                confidence_threshold: f64::NAN,
                ..SignalConfig::default()
            },
            quick_config(Some(1)),
        );
        assert!(scanner.engine().config().confidence_threshold.is_nan());
        let outcomes = scanner.scan_once(&symbols(&["AAA", "BBB"]));
        for outcome in &outcomes {
            assert!(matches!(
                outcome.result,
                Err(ScanError::Signal(SignalError::InvalidConfig { .. }))
            ));
        }
    }

    #[test]
    fn parallel_pass_matches_sequential_evaluation() {
        let source = SyntheticSource::default();
        let config = SignalConfig {
            confidence_threshold: 0.0,
            ..SignalConfig::default()
        };
        let names = symbols(&["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"]);
        let scanner = Scanner::new(source.clone(), config.clone(), quick_config(Some(1)));
        let outcomes = scanner.scan_once(&names);

        let engine = SignalEngine::new(config);
        for outcome in &outcomes {
            let candles = source.generate(&outcome.symbol, 250);
            let expected = engine.evaluate(&outcome.symbol, &candles).unwrap();
            assert_eq!(outcome.signal(), expected.as_ref());
        }
    }

    #[test]
    fn run_stops_at_max_iterations() {
        let scanner = Scanner::new(
            SyntheticSource::default(),
            SignalConfig::default(),
            quick_config(Some(3)),
        );
        let cancel = AtomicBool::new(false);
        let mut seen = 0;
        let summary = scanner.run(&symbols(&["AAA", "BBB"]), &cancel, |_| seen += 1);
        assert_eq!(summary.iterations, 3);
        assert_eq!(seen, 6);
        assert_eq!(summary.failures, 0);
    }

    #[test]
    fn run_honours_pre_set_cancel() {
        let scanner = Scanner::new(
            SyntheticSource::default(),
            SignalConfig::default(),
            quick_config(None),
        );
        let cancel = AtomicBool::new(true);
        let summary = scanner.run(&symbols(&["AAA"]), &cancel, |_| {});
        assert_eq!(summary.iterations, 0);
    }

    #[test]
    fn cancel_from_callback_ends_unbounded_run() {
        let scanner = Scanner::new(
            SyntheticSource::default(),
            SignalConfig::default(),
            ScannerConfig {
                interval: Duration::from_secs(3600),
                ..quick_config(None)
            },
        );
        let cancel = AtomicBool::new(false);
        let summary = scanner.run(&symbols(&["AAA"]), &cancel, |_| {
            cancel.store(true, Ordering::Relaxed)
        });
        assert_eq!(summary.iterations, 1);
    }

    #[test]
    fn sleep_returns_early_on_cancel() {
        let cancel = AtomicBool::new(true);
        let started = Instant::now();
        assert!(!sleep_unless_cancelled(Duration::from_secs(60), &cancel));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(sleep_unless_cancelled(Duration::ZERO, &AtomicBool::new(false)));
    }
}
