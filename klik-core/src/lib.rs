//! Klik Core: candles in, scored trade signals out.
//!
//! The pipeline is a straight line:
//! - IndicatorEngine turns candles into an `IndicatorFrame`
//! - MarketStructureDetector reads the trailing swing structure
//! - SignalEngine selects a direction, builds a RiskLadder plan, scores
//!   confidence from a fixed factor table, and gates on a threshold
//! - TradeAdvisor grades a caller-proposed trade with the same components
//!
//! Every step is pure. No I/O, no clocks, no shared mutable state.

pub mod advisor;
pub mod config;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod indicators;
pub mod risk;
pub mod signal;
pub mod structure;

pub use advisor::{TradeAdvisor, TradeIdea};
pub use config::{ConfigError, SignalConfig};
pub use domain::{Candle, Direction, PriceBar, Signal};
pub use error::SignalError;
pub use frame::{IndicatorEngine, IndicatorFrame, IndicatorRow, IndicatorSettings, MIN_CANDLES};
pub use risk::{RiskLadder, RiskPlan};
pub use signal::SignalEngine;
pub use structure::{MarketStructureDetector, StructureReading, Trend, STRUCTURE_WINDOW};

/// Indicator frame for a candle sequence with the default indicator set.
pub fn compute_indicators(candles: &[Candle]) -> Result<IndicatorFrame, SignalError> {
    IndicatorEngine::default().calculate(candles)
}

/// Structure reading over the trailing rows of a frame.
pub fn detect_structure(frame: &IndicatorFrame) -> Result<StructureReading, SignalError> {
    MarketStructureDetector::new().detect(frame)
}

/// Full evaluation. `Ok(None)` when no direction qualifies or the
/// confidence misses `config.confidence_threshold`.
pub fn evaluate_signal(
    symbol: &str,
    candles: &[Candle],
    config: &SignalConfig,
) -> Result<Option<Signal>, SignalError> {
    SignalEngine::new(config.clone()).evaluate(symbol, candles)
}
