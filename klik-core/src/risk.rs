//! Stop and take-profit ladder.
//!
//! The stop distance is `max(volatility * k, entry * min_pct)`. A liquidity
//! anchor may pull the stop closer to entry but never pushes it further out,
//! and never closer than the `entry * min_pct` floor. Targets sit at
//! 2x/3x/4x the realized distance. Reward:risk is reported against tp2.

use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::domain::Direction;
use crate::error::SignalError;

/// Target distances as multiples of the realized stop distance.
pub const TARGET_MULTIPLES: [f64; 3] = [2.0, 3.0, 4.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPlan {
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    /// |tp2 - entry| / |entry - stop_loss|
    pub reward_risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLadder {
    atr_multiple: f64,
    min_pct_of_entry: f64,
}

impl Default for RiskLadder {
    fn default() -> Self {
        Self::new(1.6, 0.003)
    }
}

impl RiskLadder {
    pub fn new(atr_multiple: f64, min_pct_of_entry: f64) -> Self {
        Self {
            atr_multiple,
            min_pct_of_entry,
        }
    }

    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.stop_atr_multiple, config.stop_min_pct_of_entry)
    }

    /// Distance from entry before any anchor is applied.
    pub fn buffer(&self, entry: f64, volatility: f64) -> f64 {
        let volatility = if volatility.is_finite() {
            volatility.max(0.0)
        } else {
            0.0
        };
        (volatility * self.atr_multiple).max(self.floor(entry))
    }

    fn floor(&self, entry: f64) -> f64 {
        entry * self.min_pct_of_entry
    }

    pub fn build(
        &self,
        direction: Direction,
        entry: f64,
        volatility: f64,
        anchor: Option<f64>,
    ) -> Result<RiskPlan, SignalError> {
        let degenerate = |stop_distance: f64| SignalError::DegenerateRisk {
            entry,
            stop_distance,
        };
        if !entry.is_finite() || entry <= 0.0 {
            return Err(degenerate(0.0));
        }

        let buffer = self.buffer(entry, volatility);
        let sign = direction.sign();
        let distance = match anchor {
            Some(level) if level.is_finite() => {
                // Positive when the anchor sits on the stop side of entry.
                let anchor_distance = (entry - level) * sign;
                if anchor_distance > 0.0 {
                    anchor_distance.min(buffer).max(self.floor(entry))
                } else {
                    buffer
                }
            }
            _ => buffer,
        };
        if !distance.is_finite() || distance <= 0.0 {
            return Err(degenerate(distance));
        }

        let stop_loss = entry - sign * distance;
        let realized = (entry - stop_loss).abs();
        if realized <= 0.0 || stop_loss <= 0.0 {
            return Err(degenerate(realized));
        }

        let [tp1, tp2, tp3] = TARGET_MULTIPLES.map(|m| entry + sign * m * realized);
        let reward_risk = (tp2 - entry).abs() / realized;

        Ok(RiskPlan {
            stop_loss,
            tp1,
            tp2,
            tp3,
            reward_risk,
        })
    }
}
