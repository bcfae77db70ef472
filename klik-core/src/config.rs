//! Scoring weights, rule thresholds, and risk parameters.
//!
//! Every value is overridable from TOML; missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for one evaluation. Defaults reproduce the full fusion rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    // Additive confidence points, awarded when the factor holds.
    pub trend_weight: f64,
    pub breakout_weight: f64,
    pub liquidity_gap_weight: f64,
    pub volatility_weight: f64,
    pub strength_weight: f64,
    pub volume_flow_weight: f64,
    pub session_weight: f64,
    pub liquidity_pool_weight: f64,

    /// Signals below this confidence are discarded.
    pub confidence_threshold: f64,

    pub stop_atr_multiple: f64,
    pub stop_min_pct_of_entry: f64,

    // Direction rule thresholds.
    pub rsi_long_threshold: f64,
    pub rsi_short_threshold: f64,
    pub adx_floor: f64,

    /// ADX above this earns the strength bonus.
    pub strong_adx: f64,
    /// Healthy Bollinger width band (fraction of the mean).
    pub volatility_band_min: f64,
    pub volatility_band_max: f64,
    /// Active session in UTC hours, start inclusive, end exclusive.
    /// A start after the end wraps past midnight.
    pub session_start_hour: u32,
    pub session_end_hour: u32,
    /// Max distance to the liquidity pool, in ATRs.
    pub liquidity_pool_atr: f64,
    /// Rows searched for the liquidity anchor.
    pub liquidity_lookback: usize,
    /// A gap counts as fresh within this many trailing rows.
    pub gap_freshness: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            trend_weight: 40.0,
            breakout_weight: 12.0,
            liquidity_gap_weight: 8.0,
            volatility_weight: 8.0,
            strength_weight: 12.0,
            volume_flow_weight: 8.0,
            session_weight: 6.0,
            liquidity_pool_weight: 6.0,
            confidence_threshold: 90.0,
            stop_atr_multiple: 1.6,
            stop_min_pct_of_entry: 0.003,
            rsi_long_threshold: 52.0,
            rsi_short_threshold: 48.0,
            adx_floor: 18.0,
            strong_adx: 25.0,
            volatility_band_min: 0.002,
            volatility_band_max: 0.08,
            session_start_hour: 7,
            session_end_hour: 20,
            liquidity_pool_atr: 3.0,
            liquidity_lookback: 12,
            gap_freshness: 3,
        }
    }
}

impl SignalConfig {
    /// EMA/RSI-only scoring: aligned trend plus a small strength bonus.
    pub fn reduced() -> Self {
        Self {
            trend_weight: 92.0,
            breakout_weight: 0.0,
            liquidity_gap_weight: 0.0,
            volatility_weight: 0.0,
            strength_weight: 6.0,
            volume_flow_weight: 0.0,
            session_weight: 0.0,
            liquidity_pool_weight: 0.0,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded signal config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Weights paired with their field names, in scoring order.
    pub fn weights(&self) -> [(&'static str, f64); 8] {
        [
            ("trend_weight", self.trend_weight),
            ("breakout_weight", self.breakout_weight),
            ("liquidity_gap_weight", self.liquidity_gap_weight),
            ("volatility_weight", self.volatility_weight),
            ("strength_weight", self.strength_weight),
            ("volume_flow_weight", self.volume_flow_weight),
            ("session_weight", self.session_weight),
            ("liquidity_pool_weight", self.liquidity_pool_weight),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, weight) in self.weights() {
            non_negative(field, weight)?;
        }
        if !(0.0..=100.0).contains(&self.confidence_threshold) {
            return Err(invalid(
                "confidence_threshold",
                format!("must be within [0, 100], got {}", self.confidence_threshold),
            ));
        }
        if !self.stop_atr_multiple.is_finite() || self.stop_atr_multiple <= 0.0 {
            return Err(invalid(
                "stop_atr_multiple",
                format!("must be > 0, got {}", self.stop_atr_multiple),
            ));
        }
        non_negative("stop_min_pct_of_entry", self.stop_min_pct_of_entry)?;
        non_negative("adx_floor", self.adx_floor)?;
        non_negative("strong_adx", self.strong_adx)?;
        non_negative("volatility_band_min", self.volatility_band_min)?;
        non_negative("volatility_band_max", self.volatility_band_max)?;
        non_negative("liquidity_pool_atr", self.liquidity_pool_atr)?;
        for (field, value) in [
            ("rsi_long_threshold", self.rsi_long_threshold),
            ("rsi_short_threshold", self.rsi_short_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(field, format!("must be within [0, 100], got {value}")));
            }
        }
        if self.rsi_short_threshold > self.rsi_long_threshold {
            return Err(invalid(
                "rsi_short_threshold",
                format!(
                    "must not exceed rsi_long_threshold ({} > {})",
                    self.rsi_short_threshold, self.rsi_long_threshold
                ),
            ));
        }
        if self.volatility_band_max < self.volatility_band_min {
            return Err(invalid(
                "volatility_band_max",
                format!(
                    "must be >= volatility_band_min ({} < {})",
                    self.volatility_band_max, self.volatility_band_min
                ),
            ));
        }
        for (field, hour) in [
            ("session_start_hour", self.session_start_hour),
            ("session_end_hour", self.session_end_hour),
        ] {
            if hour > 24 {
                return Err(invalid(field, format!("must be within 0..=24, got {hour}")));
            }
        }
        if self.liquidity_lookback == 0 {
            return Err(invalid("liquidity_lookback", "must be >= 1".into()));
        }
        Ok(())
    }

    /// BLAKE3 hex digest of the canonical JSON form.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and >= 0, got {value}")))
    }
}
