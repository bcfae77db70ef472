//! Signal fusion: direction selection, factor scoring, and gating.

pub mod engine;
pub mod rules;

pub use engine::SignalEngine;
pub use rules::{
    in_session, liquidity_anchor, score, select_direction, Factor, Score, ScoringContext,
    FACTORS, MAX_CONFIDENCE,
};
