//! Pipeline error kinds. All are recoverable by the caller.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// Not enough candles for the required lookback. Supply more history.
    #[error("insufficient history: need at least {required} candles, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Stop distance came out zero or negative; no usable ladder exists.
    #[error("degenerate risk: stop distance {stop_distance} for entry {entry}")]
    DegenerateRisk { entry: f64, stop_distance: f64 },

    /// A candle failed validation. The whole sequence is rejected.
    #[error("invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },

    /// A weight, threshold or indicator window is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl From<ConfigError> for SignalError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid { field, reason } => SignalError::InvalidConfig { field, reason },
            other => SignalError::InvalidConfig {
                field: "config",
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = SignalError::InsufficientHistory {
            required: 30,
            available: 5,
        };
        assert_eq!(
            e.to_string(),
            "insufficient history: need at least 30 candles, got 5"
        );

        let e = SignalError::InvalidCandle {
            index: 3,
            reason: "close must be finite and > 0, got 0".into(),
        };
        assert!(e.to_string().starts_with("invalid candle at index 3"));
    }

    #[test]
    fn config_error_keeps_field() {
        let err: SignalError = ConfigError::Invalid {
            field: "adx_floor",
            reason: "must be finite and >= 0, got -1".into(),
        }
        .into();
        assert_eq!(
            err,
            SignalError::InvalidConfig {
                field: "adx_floor",
                reason: "must be finite and >= 0, got -1".into(),
            }
        );
    }
}
