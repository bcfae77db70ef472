//! Equal highs / equal lows: resting liquidity above or below price.
//!
//! A bar is flagged when the trailing `window` highs (or lows), rounded to
//! cents, take fewer than `max_distinct` distinct values, i.e. the market
//! keeps tagging the same level. Bars before the first full window are
//! never flagged.

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSide {
    High,
    Low,
}

#[derive(Debug, Clone)]
pub struct EqualLevels {
    side: LevelSide,
    window: usize,
    max_distinct: usize,
}

impl EqualLevels {
    pub fn highs() -> Self {
        Self::new(LevelSide::High, 10, 8)
    }

    pub fn lows() -> Self {
        Self::new(LevelSide::Low, 10, 8)
    }

    pub fn new(side: LevelSide, window: usize, max_distinct: usize) -> Self {
        Self {
            side,
            window,
            max_distinct,
        }
    }

    pub fn flags(&self, candles: &[Candle]) -> Vec<bool> {
        let cents: Vec<i64> = candles
            .iter()
            .map(|c| {
                let level = match self.side {
                    LevelSide::High => c.high,
                    LevelSide::Low => c.low,
                };
                (level * 100.0).round() as i64
            })
            .collect();

        let mut out = vec![false; candles.len()];
        if self.window == 0 || cents.len() < self.window {
            return out;
        }
        let mut scratch = Vec::with_capacity(self.window);
        for i in (self.window - 1)..cents.len() {
            scratch.clear();
            scratch.extend_from_slice(&cents[i + 1 - self.window..=i]);
            scratch.sort_unstable();
            scratch.dedup();
            out[i] = scratch.len() < self.max_distinct;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_candles, make_ohlc_candles};

    #[test]
    fn repeated_highs_are_flagged_after_full_window() {
        let candles = make_ohlc_candles(&[(99.0, 101.0, 98.0, 100.0); 12]);
        let flags = EqualLevels::highs().flags(&candles);
        assert!(flags[..9].iter().all(|f| !f));
        assert!(flags[9..].iter().all(|&f| f));
    }

    #[test]
    fn trending_bars_have_no_equal_levels() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        assert!(EqualLevels::highs().flags(&candles).iter().all(|f| !f));
        assert!(EqualLevels::lows().flags(&candles).iter().all(|f| !f));
    }

    #[test]
    fn distinct_count_boundary() {
        // Window of 10 lows with 8 distinct values: not flagged.
        let eight: Vec<(f64, f64, f64, f64)> = [1, 2, 3, 4, 5, 6, 7, 8, 8, 8]
            .iter()
            .map(|&k| (60.0, 61.0, 50.0 + k as f64, 60.0))
            .collect();
        assert!(!EqualLevels::lows().flags(&make_ohlc_candles(&eight))[9]);

        // 7 distinct values: flagged.
        let seven: Vec<(f64, f64, f64, f64)> = [1, 2, 3, 4, 5, 6, 7, 7, 7, 7]
            .iter()
            .map(|&k| (60.0, 61.0, 50.0 + k as f64, 60.0))
            .collect();
        assert!(EqualLevels::lows().flags(&make_ohlc_candles(&seven))[9]);
    }

    #[test]
    fn rounding_to_cents_merges_near_equal_levels() {
        let candles = make_ohlc_candles(&[
            (99.0, 101.001, 98.0, 100.0),
            (99.0, 101.002, 98.0, 100.0),
            (99.0, 100.998, 98.0, 100.0),
        ]);
        let flags = EqualLevels::new(LevelSide::High, 3, 2).flags(&candles);
        assert_eq!(flags, vec![false, false, true]);
    }
}
