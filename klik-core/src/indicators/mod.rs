//! Concrete indicator implementations.
//!
//! Every indicator implements [`Indicator`]: candle history in, one numeric
//! series of the same length out. Values inside an indicator's own warm-up
//! are `f64::NAN`; the frame builder fills them (see `frame`).
//!
//! Multi-line indicators (MACD, Bollinger, directional movement) also offer
//! a `*_series` function that computes every line in one pass; the frame
//! builder uses those. Liquidity gaps and equal highs/lows are boolean flags,
//! not series.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod gap;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod swing;
pub mod volume;

pub use adx::{directional_series, Adx, DirectionalSeries};
pub use atr::{true_range, Atr};
pub use bollinger::{bollinger_series, Bollinger, BollingerSeries};
pub use ema::{ema_of_series, Ema};
pub use gap::{GapSide, LiquidityGap};
pub use levels::{EqualLevels, LevelSide};
pub use macd::{macd_series, MacdSeries};
pub use rsi::Rsi;
pub use swing::{SwingExtreme, SwingSide};
pub use volume::{ChaikinMoneyFlow, Vwap};

use crate::domain::Candle;

/// Floor for denominators that legitimately reach zero in quiet markets.
pub const EPSILON: f64 = 1e-12;

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at index t may depend on candles after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g. "ema_21", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading values that are `f64::NAN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole candle series.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

pub(crate) fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Rolling sum over `period` values. NaN until the window is full, and for
/// any window containing NaN.
pub fn rolling_sum(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum();
    }
    result
}

/// Rolling arithmetic mean over `period` values.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling_sum(values, period)
        .into_iter()
        .map(|s| s / period as f64)
        .collect()
}

/// Wilder smoothing (alpha = 1/period).
///
/// Seeded with the mean of the first `period` values after the leading NaN
/// run. A NaN after the seed carries the previous smoothed value forward.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(s) => s,
        None => return result,
    };
    let seed_end = start + period;
    if seed_end > n {
        return result;
    }
    let seed_window = &values[start..seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }

    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if !values[i].is_nan() {
            prev += alpha * (values[i] - prev);
        }
        result[i] = prev;
    }
    result
}

/// Build candles from close prices for testing.
///
/// open = previous close (or close for the first bar),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0,
/// volume = 1000, 15-minute spacing from 2024-01-02 00:00 UTC.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let data: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_candles(&data)
}

/// Build candles from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::new(
                base + chrono::Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
