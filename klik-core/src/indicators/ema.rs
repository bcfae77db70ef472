//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (close[t] - EMA[t-1]),
//! alpha = 2 / (span + 1).
//! Seed: EMA[0] = close[0], so there is no warm-up gap.
//! Lookback: 0.

use super::{closes, Indicator};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        ema_of_series(&closes(candles), self.span)
    }
}

/// EMA of an arbitrary series, seeded with its first non-NaN value.
///
/// Used directly by composed indicators (MACD signal line). NaN inputs
/// after the seed hold the previous value.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(s) => s,
        None => return result,
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[start];
    result[start] = prev;
    for i in (start + 1)..n {
        if !values[i].is_nan() {
            prev += alpha * (values[i] - prev);
        }
        result[i] = prev;
    }
    result
}
