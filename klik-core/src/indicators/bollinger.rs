//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//! - Width: (upper - lower) / max(middle, EPSILON)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::{closes, Indicator, EPSILON};
use crate::domain::Candle;

/// Band width as a single series, the volatility reading the scorer uses.
#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bollinger_width_{period}_{multiplier}"),
        }
    }
}

/// All four Bollinger series.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
}

pub fn bollinger_series(closes: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let n = closes.len();
    let mut out = BollingerSeries {
        upper: vec![f64::NAN; n],
        middle: vec![f64::NAN; n],
        lower: vec![f64::NAN; n],
        width: vec![f64::NAN; n],
    };
    if period == 0 || n < period {
        return out;
    }

    for i in (period - 1)..n {
        let window = &closes[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();
        let upper = mean + multiplier * stddev;
        let lower = mean - multiplier * stddev;

        out.middle[i] = mean;
        out.upper[i] = upper;
        out.lower[i] = lower;
        out.width[i] = (upper - lower) / mean.abs().max(EPSILON);
    }
    out
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        bollinger_series(&closes(candles), self.period, self.multiplier).width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let s = bollinger_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);

        assert!(s.middle[0].is_nan());
        assert!(s.middle[1].is_nan());
        assert_approx(s.middle[2], 11.0, DEFAULT_EPSILON);
        assert_approx(s.middle[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let s = bollinger_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);
        for i in 2..5 {
            let half_width = s.upper[i] - s.middle[i];
            assert_approx(s.middle[i] - s.lower[i], half_width, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn width_is_span_over_mean() {
        // window 10, 11, 12: mean 11, population stddev sqrt(2/3)
        let candles = make_candles(&[10.0, 11.0, 12.0]);
        let width = Bollinger::new(3, 2.0).compute(&candles);
        let expected = 4.0 * (2.0_f64 / 3.0).sqrt() / 11.0;
        assert_approx(width[2], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let s = bollinger_series(&[100.0; 4], 3, 2.0);
        assert_approx(s.upper[2], 100.0, DEFAULT_EPSILON);
        assert_approx(s.lower[2], 100.0, DEFAULT_EPSILON);
        let width = Bollinger::new(3, 2.0).compute(&make_candles(&[100.0; 4]));
        assert_approx(width[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_lookback_and_name() {
        let bands = Bollinger::new(20, 2.0);
        assert_eq!(bands.lookback(), 19);
        assert_eq!(bands.name(), "bollinger_width_20_2");
    }
}
