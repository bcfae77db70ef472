//! SignalEngine: candles → indicators → structure → direction → ladder → gate.
//!
//! Every call starts from the candles it is given. Nothing is cached between
//! calls, and a gated evaluation is never returned.

use crate::config::SignalConfig;
use crate::domain::{Candle, Signal};
use crate::error::SignalError;
use crate::frame::{IndicatorEngine, IndicatorFrame, MIN_CANDLES};
use crate::risk::RiskLadder;
use crate::structure::MarketStructureDetector;

use super::rules::{liquidity_anchor, score, select_direction, ScoringContext};

#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: SignalConfig,
    indicators: IndicatorEngine,
    structure: MarketStructureDetector,
    risk: RiskLadder,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            risk: RiskLadder::from_config(&config),
            indicators: IndicatorEngine::default(),
            structure: MarketStructureDetector::new(),
            config,
        }
    }

    pub fn with_indicators(mut self, indicators: IndicatorEngine) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Full pipeline over a candle window. `Ok(None)` means no direction
    /// qualified or the confidence was below the threshold. An out-of-range
    /// config is reported as `InvalidConfig` before any candle is read.
    pub fn evaluate(&self, symbol: &str, candles: &[Candle]) -> Result<Option<Signal>, SignalError> {
        self.config.validate()?;
        let frame = self.indicators.calculate(candles)?;
        self.score_frame(symbol, &frame)
    }

    pub fn evaluate_frame(
        &self,
        symbol: &str,
        frame: &IndicatorFrame,
    ) -> Result<Option<Signal>, SignalError> {
        self.config.validate()?;
        self.score_frame(symbol, frame)
    }

    fn score_frame(
        &self,
        symbol: &str,
        frame: &IndicatorFrame,
    ) -> Result<Option<Signal>, SignalError> {
        let structure = self.structure.detect(frame)?;
        let row = frame.last().ok_or(SignalError::InsufficientHistory {
            required: MIN_CANDLES,
            available: 0,
        })?;

        let Some(direction) = select_direction(row, &structure, &self.config) else {
            log::debug!("{symbol}: no direction (trend {})", structure.trend);
            return Ok(None);
        };

        let anchor = liquidity_anchor(frame.rows(), direction, self.config.liquidity_lookback);
        let plan = self.risk.build(direction, row.close, row.atr, anchor)?;

        let ctx = ScoringContext {
            direction,
            row,
            recent: frame.tail(self.config.gap_freshness),
            structure: &structure,
            anchor,
            config: &self.config,
        };
        let score = score(&ctx);

        if score.confidence < self.config.confidence_threshold {
            log::debug!(
                "{symbol}: {direction} gated at {:.1} (threshold {:.1})",
                score.confidence,
                self.config.confidence_threshold
            );
            return Ok(None);
        }

        log::info!(
            "{symbol}: {direction} signal, confidence {:.1}, entry {:.4}, stop {:.4}",
            score.confidence,
            row.close,
            plan.stop_loss
        );
        Ok(Some(Signal {
            symbol: symbol.to_string(),
            direction,
            entry: row.close,
            stop_loss: plan.stop_loss,
            tp1: plan.tp1,
            tp2: plan.tp2,
            tp3: plan.tp3,
            reward_risk: plan.reward_risk,
            confidence: score.confidence,
            rationale: score.rationale,
            created_at: row.timestamp,
        }))
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}
