//! Liquidity gaps (fair-value gaps) between non-adjacent candles.
//!
//! Up gap at t:   low[t] > high[t-2]
//! Down gap at t: high[t] < low[t-2]
//! Output is one flag per candle; the first two candles can never gap.

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapSide {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct LiquidityGap {
    side: GapSide,
}

impl LiquidityGap {
    pub fn up() -> Self {
        Self { side: GapSide::Up }
    }

    pub fn down() -> Self {
        Self {
            side: GapSide::Down,
        }
    }

    /// Gap flags as booleans.
    pub fn flags(&self, candles: &[Candle]) -> Vec<bool> {
        (0..candles.len())
            .map(|i| {
                if i < 2 {
                    return false;
                }
                let (now, before) = (&candles[i], &candles[i - 2]);
                match self.side {
                    GapSide::Up => now.low > before.high,
                    GapSide::Down => now.high < before.low,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_candles;

    #[test]
    fn detects_up_gap() {
        let candles = make_ohlc_candles(&[
            (100.0, 101.0, 99.0, 100.5),
            (100.5, 104.0, 100.0, 103.5),
            (103.5, 106.0, 102.0, 105.0), // low 102 > high[0] 101
        ]);
        assert_eq!(LiquidityGap::up().flags(&candles), vec![false, false, true]);
        assert_eq!(LiquidityGap::down().flags(&candles), vec![false, false, false]);
    }

    #[test]
    fn detects_down_gap() {
        let candles = make_ohlc_candles(&[
            (100.0, 101.0, 99.0, 99.5),
            (99.5, 100.0, 96.0, 96.5),
            (96.5, 98.0, 95.0, 95.5), // high 98 < low[0] 99
        ]);
        assert_eq!(LiquidityGap::down().flags(&candles), vec![false, false, true]);
    }

    #[test]
    fn touching_bars_do_not_gap() {
        let candles = make_ohlc_candles(&[
            (100.0, 101.0, 99.0, 100.5),
            (100.5, 102.0, 100.0, 101.5),
            (101.5, 103.0, 101.0, 102.5), // low == high[0]
        ]);
        assert!(!LiquidityGap::up().flags(&candles)[2]);
    }
}
