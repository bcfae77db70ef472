//! IndicatorEngine: candles in, one fully populated row per candle out.
//!
//! Warm-up policy: every series is computed with its exact recurrence, then
//! NaN values inside its warm-up are back-filled from the first defined
//! value (any later gap is forward-filled). No row is dropped, so the frame
//! has exactly as many rows as there are candles. The first
//! [`IndicatorFrame::warmup_len`] rows are statistically unreliable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::{validate_candles, Candle, PriceBar};
use crate::error::SignalError;
use crate::indicators::{
    bollinger_series, directional_series, macd_series, Adx, Atr, Bollinger, ChaikinMoneyFlow, Ema,
    EqualLevels, Indicator, LiquidityGap, Rsi, SwingExtreme, Vwap,
};

/// Hard minimum number of candles before any windowed value exists.
pub const MIN_CANDLES: usize = 30;

/// Window lengths used by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub adx_period: usize,
    pub cmf_period: usize,
    pub swing_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_mid: 21,
            ema_slow: 200,
            rsi_period: 14,
            atr_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            adx_period: 14,
            cmf_period: 20,
            swing_period: 50,
        }
    }
}

impl IndicatorSettings {
    /// Every window must span at least one bar, and MACD's slow span must
    /// exceed its fast span.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, period) in [
            ("ema_fast", self.ema_fast),
            ("ema_mid", self.ema_mid),
            ("ema_slow", self.ema_slow),
            ("rsi_period", self.rsi_period),
            ("atr_period", self.atr_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("adx_period", self.adx_period),
            ("cmf_period", self.cmf_period),
            ("swing_period", self.swing_period),
        ] {
            if period == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be >= 1".into(),
                });
            }
        }
        if self.macd_slow <= self.macd_fast {
            return Err(ConfigError::Invalid {
                field: "macd_slow",
                reason: format!(
                    "must exceed macd_fast ({} <= {})",
                    self.macd_slow, self.macd_fast
                ),
            });
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier < 0.0 {
            return Err(ConfigError::Invalid {
                field: "bollinger_multiplier",
                reason: format!("must be finite and >= 0, got {}", self.bollinger_multiplier),
            });
        }
        Ok(())
    }
}

/// One candle plus every derived field. No field is ever NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ema_fast: f64,
    pub ema_mid: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub atr: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_mid: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub bb_width: f64,
    pub vwap: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub cmf: f64,
    pub swing_high: f64,
    pub swing_low: f64,
    pub fvg_up: bool,
    pub fvg_down: bool,
    /// Trailing highs keep tagging the same level (liquidity above).
    pub eq_highs: bool,
    /// Trailing lows keep tagging the same level (liquidity below).
    pub eq_lows: bool,
}

impl IndicatorRow {
    /// All numeric fields, for NaN checks.
    pub fn numeric_fields(&self) -> [f64; 24] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ema_fast,
            self.ema_mid,
            self.ema_slow,
            self.rsi,
            self.atr,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.bb_mid,
            self.bb_upper,
            self.bb_lower,
            self.bb_width,
            self.vwap,
            self.adx,
            self.plus_di,
            self.minus_di,
            self.cmf,
            self.swing_high,
            self.swing_low,
        ]
    }
}

impl PriceBar for IndicatorRow {
    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

/// Indicator rows for a candle sequence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
    warmup: usize,
}

impl IndicatorFrame {
    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// The trailing `n` rows (all rows if fewer).
    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Number of leading rows inside the longest warm-up window.
    pub fn warmup_len(&self) -> usize {
        self.warmup
    }

    pub fn is_reliable(&self, index: usize) -> bool {
        index >= self.warmup && index < self.rows.len()
    }
}

/// Computes the fixed indicator set. Stateless; one instance can serve any
/// number of concurrent callers. Settings are checked once, at construction.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Result<Self, SignalError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Longest lookback across the indicator set, counting the slow EMA's span.
    pub fn warmup_window(&self) -> usize {
        let s = &self.settings;
        let lookbacks = [
            Rsi::new(s.rsi_period).lookback(),
            Atr::new(s.atr_period).lookback(),
            ChaikinMoneyFlow::new(s.cmf_period).lookback(),
            Bollinger::new(s.bollinger_period, s.bollinger_multiplier).lookback(),
            Adx::new(s.adx_period).lookback(),
        ];
        lookbacks
            .into_iter()
            .chain([s.ema_fast, s.ema_mid, s.ema_slow, s.macd_slow, s.swing_period])
            .max()
            .unwrap_or(0)
    }

    pub fn calculate(&self, candles: &[Candle]) -> Result<IndicatorFrame, SignalError> {
        if candles.len() < MIN_CANDLES {
            return Err(SignalError::InsufficientHistory {
                required: MIN_CANDLES,
                available: candles.len(),
            });
        }
        validate_candles(candles)?;

        let s = &self.settings;
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let ema_fast = Ema::new(s.ema_fast).compute(candles);
        let ema_mid = Ema::new(s.ema_mid).compute(candles);
        let ema_slow = Ema::new(s.ema_slow).compute(candles);
        let rsi = fill_warmup(Rsi::new(s.rsi_period).compute(candles), 50.0);
        let atr = fill_warmup(Atr::new(s.atr_period).compute(candles), 0.0);
        let macd = macd_series(&closes, s.macd_fast, s.macd_slow, s.macd_signal);
        let bands = bollinger_series(&closes, s.bollinger_period, s.bollinger_multiplier);
        let bb_mid = fill_warmup(bands.middle, 0.0);
        let bb_upper = fill_warmup(bands.upper, 0.0);
        let bb_lower = fill_warmup(bands.lower, 0.0);
        let bb_width = fill_warmup(bands.width, 0.0);
        let vwap = Vwap.compute(candles);
        let directional = directional_series(candles, s.adx_period);
        let adx = fill_warmup(directional.adx, 0.0);
        let plus_di = fill_warmup(directional.plus_di, 0.0);
        let minus_di = fill_warmup(directional.minus_di, 0.0);
        let cmf = fill_warmup(ChaikinMoneyFlow::new(s.cmf_period).compute(candles), 0.0);
        let swing_high = SwingExtreme::high(s.swing_period).compute(candles);
        let swing_low = SwingExtreme::low(s.swing_period).compute(candles);
        let fvg_up = LiquidityGap::up().flags(candles);
        let fvg_down = LiquidityGap::down().flags(candles);
        let eq_highs = EqualLevels::highs().flags(candles);
        let eq_lows = EqualLevels::lows().flags(candles);

        let rows = candles
            .iter()
            .enumerate()
            .map(|(i, c)| IndicatorRow {
                timestamp: c.timestamp,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
                ema_fast: ema_fast[i],
                ema_mid: ema_mid[i],
                ema_slow: ema_slow[i],
                rsi: rsi[i],
                atr: atr[i],
                macd: macd.macd[i],
                macd_signal: macd.signal[i],
                macd_hist: macd.histogram[i],
                bb_mid: bb_mid[i],
                bb_upper: bb_upper[i],
                bb_lower: bb_lower[i],
                bb_width: bb_width[i],
                vwap: vwap[i],
                adx: adx[i],
                plus_di: plus_di[i],
                minus_di: minus_di[i],
                cmf: cmf[i],
                swing_high: swing_high[i],
                swing_low: swing_low[i],
                fvg_up: fvg_up[i],
                fvg_down: fvg_down[i],
                eq_highs: eq_highs[i],
                eq_lows: eq_lows[i],
            })
            .collect::<Vec<_>>();

        let warmup = self.warmup_window().min(rows.len());
        log::debug!(
            "computed {} indicator rows ({} inside warm-up)",
            rows.len(),
            warmup
        );
        Ok(IndicatorFrame { rows, warmup })
    }
}

/// Back-fill leading NaN from the first defined value and forward-fill any
/// later NaN. A series with no defined value becomes `neutral`.
pub fn fill_warmup(mut values: Vec<f64>, neutral: f64) -> Vec<f64> {
    let first = match values.iter().position(|v| v.is_finite()) {
        Some(i) => i,
        None => {
            values.iter_mut().for_each(|v| *v = neutral);
            return values;
        }
    };

    let seed = values[first];
    values[..first].iter_mut().for_each(|v| *v = seed);

    let mut prev = seed;
    for v in values.iter_mut().skip(first) {
        if v.is_finite() {
            prev = *v;
        } else {
            *v = prev;
        }
    }
    values
}
