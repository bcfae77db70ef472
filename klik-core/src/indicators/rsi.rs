//! Relative Strength Index (RSI).
//!
//! Simple rolling mean of positive and negative close deltas over `period`.
//! RSI = 100 - 100 / (1 + avg_gain / max(avg_loss, EPSILON))
//! Lookback: period (the first delta needs a previous close).
//! Edge case: no movement at all (both averages below EPSILON) → 50.

use super::{closes, rolling_mean, Indicator, EPSILON};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes = closes(candles);
        let n = closes.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let change = closes[i] - closes[i - 1];
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);
        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    compute_rsi(g, l)
                }
            })
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain < EPSILON && avg_loss < EPSILON {
        return 50.0;
    }
    let ratio = avg_gain / avg_loss.max(EPSILON);
    (100.0 - 100.0 / (1.0 + ratio)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn rsi_all_gains() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&candles);
        assert_approx(result[3], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let candles = make_candles(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&candles);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // [3]: gains 0.34, losses 0.73 → 100 - 100/(1 + 0.34/0.73) ≈ 31.7757
        // [4]: gains 0.72, losses 0.73 → ≈ 49.6552
        let candles = make_candles(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&candles);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 31.775_700_934_579_447, 1e-9);
        assert_approx(result[4], 49.655_172_413_793_1, 1e-9);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let candles = make_candles(&[100.0; 8]);
        let result = Rsi::new(3).compute(&candles);
        assert_approx(result[7], 50.0, 1e-12);
    }

    #[test]
    fn rsi_bounds() {
        let candles = make_candles(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&candles);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
