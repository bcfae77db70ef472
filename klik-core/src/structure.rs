//! Market structure over the trailing six rows.
//!
//! Swing comparisons use every other bar: `high[-1]` vs `high[-3]` vs
//! `high[-5]`, and the same for lows. Comparisons are strict, so ties set no
//! flag.

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;
use crate::error::SignalError;
use crate::frame::IndicatorFrame;

/// Rows needed for one reading.
pub const STRUCTURE_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Range,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Range => "range",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReading {
    pub trend: Trend,
    pub higher_high: bool,
    pub higher_low: bool,
    pub lower_high: bool,
    pub lower_low: bool,
    pub breakout: bool,
    pub character_change: bool,
}

/// Stateless; each call reads only the rows it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketStructureDetector;

impl MarketStructureDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, frame: &IndicatorFrame) -> Result<StructureReading, SignalError> {
        detect_structure(frame.rows())
    }
}

/// Structure of the trailing [`STRUCTURE_WINDOW`] bars of any price series.
pub fn detect_structure<B: PriceBar>(bars: &[B]) -> Result<StructureReading, SignalError> {
    if bars.len() < STRUCTURE_WINDOW {
        return Err(SignalError::InsufficientHistory {
            required: STRUCTURE_WINDOW,
            available: bars.len(),
        });
    }
    let window = &bars[bars.len() - STRUCTURE_WINDOW..];
    let high = |i: usize| window[i].high();
    let low = |i: usize| window[i].low();

    let higher_high = high(5) > high(3) && high(3) > high(1);
    let higher_low = low(5) > low(3) && low(3) > low(1);
    let lower_high = high(5) < high(3) && high(3) < high(1);
    let lower_low = low(5) < low(3) && low(3) < low(1);

    let trend = if higher_high && higher_low {
        Trend::Bullish
    } else if lower_high && lower_low {
        Trend::Bearish
    } else {
        Trend::Range
    };

    let prior = &window[..STRUCTURE_WINDOW - 1];
    let prior_high = prior.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max);
    let prior_low = prior.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min);
    let close = window[STRUCTURE_WINDOW - 1].close();
    let breakout = close > prior_high || close < prior_low;

    let character_change = (higher_high && lower_low) || (lower_high && higher_low);

    Ok(StructureReading {
        trend,
        higher_high,
        higher_low,
        lower_high,
        lower_low,
        breakout,
        character_change,
    })
}
