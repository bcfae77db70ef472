//! Candle: one OHLCV bar for a fixed interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// OHLCV bar for a single instrument over one interval.
///
/// Prices must be finite and strictly positive, volume finite and
/// non-negative. A sequence of candles must have strictly increasing
/// timestamps; see [`validate_candles`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// First field-level defect of this candle, if any.
    pub fn defect(&self) -> Option<String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Some(format!("{field} must be finite and > 0, got {value}"));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Some(format!(
                "volume must be finite and >= 0, got {}",
                self.volume
            ));
        }
        if self.high < self.low {
            return Some(format!("high {} below low {}", self.high, self.low));
        }
        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Some("open/close outside the high-low range".to_string());
        }
        None
    }

    /// Basic OHLCV sanity check.
    pub fn is_sane(&self) -> bool {
        self.defect().is_none()
    }
}

/// Minimal price view shared by raw candles and indicator rows, so market
/// structure can be read from either.
pub trait PriceBar {
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

impl PriceBar for Candle {
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

/// Reject the whole sequence on the first bad candle. No partial repair.
pub fn validate_candles(candles: &[Candle]) -> Result<(), SignalError> {
    for (index, candle) in candles.iter().enumerate() {
        if let Some(reason) = candle.defect() {
            return Err(SignalError::InvalidCandle { index, reason });
        }
        if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
            return Err(SignalError::InvalidCandle {
                index,
                reason: format!(
                    "timestamp {} is not after previous {}",
                    candle.timestamp,
                    candles[index - 1].timestamp
                ),
            });
        }
    }
    Ok(())
}
