//! Review of a caller-proposed trade.
//!
//! Unlike [`SignalEngine`](crate::signal::SignalEngine), the advisor never
//! picks a direction or gates. It grades the proposal and always returns a
//! ladder for it.

use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::domain::{Candle, Direction};
use crate::error::SignalError;
use crate::frame::{IndicatorEngine, MIN_CANDLES};
use crate::risk::RiskLadder;
use crate::signal::{liquidity_anchor, MAX_CONFIDENCE};
use crate::structure::{MarketStructureDetector, Trend};

const BASE_SCORE: f64 = 50.0;
const STRUCTURE_BONUS: f64 = 18.0;
const REWARD_RISK_BONUS: f64 = 15.0;
const STRENGTH_BONUS: f64 = 10.0;
const MOMENTUM_BONUS: f64 = 7.0;
const MIN_REWARD_RISK: f64 = 2.0;
const ADVISOR_ADX: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIdea {
    pub symbol: String,
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub reward_risk: f64,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone)]
pub struct TradeAdvisor {
    config: SignalConfig,
    indicators: IndicatorEngine,
    structure: MarketStructureDetector,
    risk: RiskLadder,
}

impl TradeAdvisor {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            risk: RiskLadder::from_config(&config),
            indicators: IndicatorEngine::default(),
            structure: MarketStructureDetector::new(),
            config,
        }
    }

    pub fn advise(
        &self,
        symbol: &str,
        direction: Direction,
        entry: f64,
        candles: &[Candle],
    ) -> Result<TradeIdea, SignalError> {
        self.config.validate()?;
        let frame = self.indicators.calculate(candles)?;
        let structure = self.structure.detect(&frame)?;
        let row = frame.last().ok_or(SignalError::InsufficientHistory {
            required: MIN_CANDLES,
            available: 0,
        })?;

        let anchor = liquidity_anchor(frame.rows(), direction, self.config.liquidity_lookback);
        let plan = self.risk.build(direction, entry, row.atr, anchor)?;

        let agrees = matches!(
            (structure.trend, direction),
            (Trend::Bullish, Direction::Long) | (Trend::Bearish, Direction::Short)
        );
        let momentum = match direction {
            Direction::Long => row.rsi > 50.0,
            Direction::Short => row.rsi < 50.0,
        };
        let score = BASE_SCORE
            + bonus(agrees, STRUCTURE_BONUS)
            + bonus(plan.reward_risk >= MIN_REWARD_RISK, REWARD_RISK_BONUS)
            + bonus(row.adx > ADVISOR_ADX, STRENGTH_BONUS)
            + bonus(momentum, MOMENTUM_BONUS);

        let reasoning = format!(
            "structure {}, ADX {:.1}, RSI {:.1}, ATR {:.2}, liquidity anchor {}",
            structure.trend,
            row.adx,
            row.rsi,
            row.atr,
            anchor.map_or_else(|| "none".to_string(), |level| format!("{level:.2}"))
        );

        Ok(TradeIdea {
            symbol: symbol.to_string(),
            direction,
            entry,
            stop_loss: plan.stop_loss,
            tp1: plan.tp1,
            tp2: plan.tp2,
            tp3: plan.tp3,
            reward_risk: plan.reward_risk,
            confidence: score.min(MAX_CONFIDENCE),
            reasoning,
        })
    }
}

fn bonus(condition: bool, points: f64) -> f64 {
    if condition {
        points
    } else {
        0.0
    }
}
