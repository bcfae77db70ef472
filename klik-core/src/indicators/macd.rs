//! MACD: moving average convergence/divergence.
//!
//! MACD line = EMA(fast) - EMA(slow) of close.
//! Signal line = EMA(signal) of the MACD line.
//! Histogram = MACD line - signal line.
//! All EMAs are seeded with their first input, so every line is defined
//! from the first bar.

use super::ema_of_series;

/// All three MACD lines.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_series(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_series(&macd, signal);
    let histogram = macd.iter().zip(&signal_line).map(|(m, s)| m - s).collect();
    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}
