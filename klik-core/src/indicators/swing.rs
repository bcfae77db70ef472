//! Rolling swing extremes: highest high / lowest low of the trailing window.
//!
//! The window shrinks at the start of the series instead of producing NaN,
//! so lookback is 0.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingSide {
    High,
    Low,
}

#[derive(Debug, Clone)]
pub struct SwingExtreme {
    period: usize,
    side: SwingSide,
    name: String,
}

impl SwingExtreme {
    pub fn high(period: usize) -> Self {
        Self::new(period, SwingSide::High)
    }

    pub fn low(period: usize) -> Self {
        Self::new(period, SwingSide::Low)
    }

    fn new(period: usize, side: SwingSide) -> Self {
        assert!(period >= 1, "swing period must be >= 1");
        let label = match side {
            SwingSide::High => "swing_high",
            SwingSide::Low => "swing_low",
        };
        Self {
            period,
            side,
            name: format!("{label}_{period}"),
        }
    }
}

impl Indicator for SwingExtreme {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        (0..candles.len())
            .map(|i| {
                let window = &candles[(i + 1).saturating_sub(self.period)..=i];
                match self.side {
                    SwingSide::High => window.iter().map(|c| c.high).fold(f64::MIN, f64::max),
                    SwingSide::Low => window.iter().map(|c| c.low).fold(f64::MAX, f64::min),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_candles, DEFAULT_EPSILON};

    #[test]
    fn partial_window_at_start() {
        let candles = make_candles(&[100.0, 103.0, 101.0, 99.0]);
        let highs = SwingExtreme::high(2).compute(&candles);
        // highs: 101, 104, 104, 104
        assert!((highs[0] - 101.0).abs() < DEFAULT_EPSILON);
        assert!((highs[2] - 104.0).abs() < DEFAULT_EPSILON);
        assert!((highs[3] - 104.0).abs() < DEFAULT_EPSILON);
    }

    #[test]
    fn low_tracks_minimum() {
        let candles = make_candles(&[100.0, 97.0, 101.0]);
        let lows = SwingExtreme::low(3).compute(&candles);
        // lows: 99, 96, 96
        assert!((lows[2] - 96.0).abs() < DEFAULT_EPSILON);
    }
}
