//! Direction and the emitted Signal record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fingerprint::Fingerprint;

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short. Multiplies distances away from entry.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored trading signal that cleared the confidence gate.
///
/// Only ever constructed by the signal engine. `created_at` is the timestamp
/// of the last evaluated candle, so identical inputs produce identical
/// records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    /// Reward:risk measured at `tp2`.
    pub reward_risk: f64,
    /// In [0, 99].
    pub confidence: f64,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// BLAKE3 digest over every field, bit-exact for floats.
    pub fn fingerprint(&self) -> String {
        Fingerprint::new()
            .text(&self.symbol)
            .text(self.direction.as_str())
            .number(self.entry)
            .number(self.stop_loss)
            .number(self.tp1)
            .number(self.tp2)
            .number(self.tp3)
            .number(self.reward_risk)
            .number(self.confidence)
            .text(&self.rationale)
            .integer(self.created_at.timestamp_millis())
            .finish()
    }
}
