//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive candles
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! A window with no range (smoothed TR below EPSILON) reads as no
//! directional movement: DI = 0 and DX = 0.
//! Lookback: 2 * period - 1.

use super::{true_range, wilder_smooth, Indicator, EPSILON};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

/// +DI, -DI and ADX, each in [0, 100] where defined.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalSeries {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

pub fn directional_series(candles: &[Candle], period: usize) -> DirectionalSeries {
    let n = candles.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    // TR[0] has no previous close; align its seed with the DM series.
    let mut tr = true_range(candles);
    if let Some(first) = tr.first_mut() {
        *first = f64::NAN;
    }

    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        if smooth_tr[i] < EPSILON {
            plus_di[i] = 0.0;
            minus_di[i] = 0.0;
            dx[i] = 0.0;
            continue;
        }

        let p = (100.0 * smooth_plus[i] / smooth_tr[i]).clamp(0.0, 100.0);
        let m = (100.0 * smooth_minus[i] / smooth_tr[i]).clamp(0.0, 100.0);
        plus_di[i] = p;
        minus_di[i] = m;
        let di_sum = p + m;
        dx[i] = if di_sum < EPSILON {
            0.0
        } else {
            100.0 * (p - m).abs() / di_sum
        };
    }

    let adx = wilder_smooth(&dx, period)
        .into_iter()
        .map(|v| if v.is_nan() { v } else { v.clamp(0.0, 100.0) })
        .collect();

    DirectionalSeries {
        plus_di,
        minus_di,
        adx,
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        directional_series(candles, self.period).adx
    }
}
