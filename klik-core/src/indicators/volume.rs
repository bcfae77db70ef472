//! Volume-flow indicators: VWAP and Chaikin money flow.

use super::{rolling_sum, Indicator, EPSILON};
use crate::domain::Candle;

/// Cumulative volume-weighted average price.
///
/// VWAP[t] = sum(typical * volume) / sum(volume) over candles 0..=t.
/// While cumulative volume is still zero, VWAP is the bar's typical price.
#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut cum_pv = 0.0;
        let mut cum_vol = 0.0;
        candles
            .iter()
            .map(|c| {
                let typical = c.typical_price();
                cum_pv += typical * c.volume;
                cum_vol += c.volume;
                if cum_vol < EPSILON {
                    typical
                } else {
                    cum_pv / cum_vol
                }
            })
            .collect()
    }
}

/// Chaikin money flow over `period`, in [-1, 1].
///
/// Money-flow multiplier = ((close - low) - (high - close)) / (high - low),
/// zero for a bar with no range. CMF = sum(multiplier * volume) / sum(volume),
/// zero when the window has no volume.
/// Lookback: period - 1.
#[derive(Debug, Clone)]
pub struct ChaikinMoneyFlow {
    period: usize,
    name: String,
}

impl ChaikinMoneyFlow {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CMF period must be >= 1");
        Self {
            period,
            name: format!("cmf_{period}"),
        }
    }
}

impl Indicator for ChaikinMoneyFlow {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let flow: Vec<f64> = candles
            .iter()
            .map(|c| {
                let range = c.high - c.low;
                if range < EPSILON {
                    0.0
                } else {
                    ((c.close - c.low) - (c.high - c.close)) / range * c.volume
                }
            })
            .collect();
        let volume: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        let flow_sum = rolling_sum(&flow, self.period);
        let volume_sum = rolling_sum(&volume, self.period);
        flow_sum
            .iter()
            .zip(&volume_sum)
            .map(|(&f, &v)| {
                if f.is_nan() || v.is_nan() {
                    f64::NAN
                } else if v < EPSILON {
                    0.0
                } else {
                    (f / v).clamp(-1.0, 1.0)
                }
            })
            .collect()
    }
}
