//! Direction rules and the additive confidence table.
//!
//! Scoring is a fixed, ordered list of factors. Each factor pairs a weight
//! from [`SignalConfig`] with a predicate and a human-readable reason. The
//! order of [`FACTORS`] is the order reasons appear in a rationale.

use chrono::Timelike;

use crate::config::SignalConfig;
use crate::domain::Direction;
use crate::frame::IndicatorRow;
use crate::structure::{StructureReading, Trend};

/// Confidence never reaches absolute certainty.
pub const MAX_CONFIDENCE: f64 = 99.0;

/// Everything a factor may look at. Borrowed for one evaluation only.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub direction: Direction,
    /// The latest row.
    pub row: &'a IndicatorRow,
    /// Trailing rows within the gap freshness window, latest last.
    pub recent: &'a [IndicatorRow],
    pub structure: &'a StructureReading,
    /// Liquidity pool level (extreme of the lookback window), if any.
    pub anchor: Option<f64>,
    pub config: &'a SignalConfig,
}

/// One additive term of the confidence score.
pub struct Factor {
    pub name: &'static str,
    pub weight: fn(&SignalConfig) -> f64,
    pub holds: fn(&ScoringContext<'_>) -> bool,
    pub reason: fn(&ScoringContext<'_>) -> String,
}

impl std::fmt::Debug for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factor").field("name", &self.name).finish()
    }
}

pub static FACTORS: [Factor; 8] = [
    Factor {
        name: "trend_alignment",
        weight: |c| c.trend_weight,
        holds: trend_aligned,
        reason: |ctx| {
            format!(
                "{} structure, close {:.2} {} EMA200 {:.2}",
                ctx.structure.trend,
                ctx.row.close,
                side_word(ctx.direction),
                ctx.row.ema_slow
            )
        },
    },
    Factor {
        name: "breakout",
        weight: |c| c.breakout_weight,
        holds: |ctx| ctx.structure.breakout && !ctx.structure.character_change,
        reason: |_| "clean breakout without character change".to_string(),
    },
    Factor {
        name: "liquidity_gap",
        weight: |c| c.liquidity_gap_weight,
        holds: fresh_gap,
        reason: |ctx| {
            let side = match ctx.direction {
                Direction::Long => "bullish",
                Direction::Short => "bearish",
            };
            format!("fresh {side} fair-value gap")
        },
    },
    Factor {
        name: "volatility",
        weight: |c| c.volatility_weight,
        holds: |ctx| {
            let width = ctx.row.bb_width;
            width >= ctx.config.volatility_band_min && width <= ctx.config.volatility_band_max
        },
        reason: |ctx| format!("band width {:.4} in healthy range", ctx.row.bb_width),
    },
    Factor {
        name: "strength",
        weight: |c| c.strength_weight,
        holds: |ctx| ctx.row.adx > ctx.config.strong_adx,
        reason: |ctx| {
            format!(
                "ADX {:.2} above {:.2}",
                ctx.row.adx, ctx.config.strong_adx
            )
        },
    },
    Factor {
        name: "volume_flow",
        weight: |c| c.volume_flow_weight,
        holds: volume_confirms,
        reason: |ctx| {
            format!(
                "CMF {:.2}, close {} VWAP {:.2}",
                ctx.row.cmf,
                side_word(ctx.direction),
                ctx.row.vwap
            )
        },
    },
    Factor {
        name: "session",
        weight: |c| c.session_weight,
        holds: |ctx| {
            in_session(
                ctx.row.timestamp.hour(),
                ctx.config.session_start_hour,
                ctx.config.session_end_hour,
            )
        },
        reason: |ctx| format!("active session hour {:02} UTC", ctx.row.timestamp.hour()),
    },
    Factor {
        name: "liquidity_pool",
        weight: |c| c.liquidity_pool_weight,
        holds: near_pool,
        reason: |ctx| match ctx.anchor {
            Some(level) => format!("liquidity pool {level:.2} within reach"),
            None => "liquidity pool within reach".to_string(),
        },
    },
];

fn side_word(direction: Direction) -> &'static str {
    match direction {
        Direction::Long => "above",
        Direction::Short => "below",
    }
}

fn trend_aligned(ctx: &ScoringContext<'_>) -> bool {
    match ctx.direction {
        Direction::Long => {
            ctx.structure.trend == Trend::Bullish && ctx.row.close > ctx.row.ema_slow
        }
        Direction::Short => {
            ctx.structure.trend == Trend::Bearish && ctx.row.close < ctx.row.ema_slow
        }
    }
}

fn fresh_gap(ctx: &ScoringContext<'_>) -> bool {
    ctx.recent.iter().any(|row| match ctx.direction {
        Direction::Long => row.fvg_up,
        Direction::Short => row.fvg_down,
    })
}

fn volume_confirms(ctx: &ScoringContext<'_>) -> bool {
    match ctx.direction {
        Direction::Long => ctx.row.cmf > 0.0 && ctx.row.close > ctx.row.vwap,
        Direction::Short => ctx.row.cmf < 0.0 && ctx.row.close < ctx.row.vwap,
    }
}

fn near_pool(ctx: &ScoringContext<'_>) -> bool {
    ctx.anchor.is_some_and(|level| {
        (ctx.row.close - level).abs() <= ctx.config.liquidity_pool_atr * ctx.row.atr
    })
}

/// Whether `hour` falls in `[start, end)`, wrapping past midnight when
/// `start > end`. An empty range (`start == end`) matches nothing.
pub fn in_session(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

/// Conjunctive direction rule. `None` when neither side fully qualifies.
pub fn select_direction(
    row: &IndicatorRow,
    structure: &StructureReading,
    config: &SignalConfig,
) -> Option<Direction> {
    let strong = row.adx > config.adx_floor;
    let long = structure.trend == Trend::Bullish
        && row.ema_fast > row.ema_mid
        && row.ema_mid > row.ema_slow
        && row.macd_hist > 0.0
        && row.rsi > config.rsi_long_threshold
        && strong;
    let short = structure.trend == Trend::Bearish
        && row.ema_fast < row.ema_mid
        && row.ema_mid < row.ema_slow
        && row.macd_hist < 0.0
        && row.rsi < config.rsi_short_threshold
        && strong;

    match (long, short) {
        (true, false) => Some(Direction::Long),
        (false, true) => Some(Direction::Short),
        _ => None,
    }
}

/// Lowest low (long) or highest high (short) of the trailing `lookback` rows.
pub fn liquidity_anchor(rows: &[IndicatorRow], direction: Direction, lookback: usize) -> Option<f64> {
    let window = &rows[rows.len().saturating_sub(lookback)..];
    if window.is_empty() {
        return None;
    }
    let level = match direction {
        Direction::Long => window.iter().map(|r| r.low).fold(f64::INFINITY, f64::min),
        Direction::Short => window.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max),
    };
    Some(level)
}

/// Outcome of running the factor table.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub confidence: f64,
    /// Names of the contributing factors, in table order.
    pub fired: Vec<&'static str>,
    pub rationale: String,
}

pub fn score(ctx: &ScoringContext<'_>) -> Score {
    let mut total = 0.0;
    let mut fired = Vec::new();
    let mut reasons = Vec::new();
    for factor in FACTORS.iter() {
        let weight = (factor.weight)(ctx.config);
        // Zero-weight factors contribute neither points nor reasons.
        if weight > 0.0 && (factor.holds)(ctx) {
            total += weight;
            fired.push(factor.name);
            reasons.push((factor.reason)(ctx));
        }
    }

    let body = if reasons.is_empty() {
        "direction rules satisfied".to_string()
    } else {
        reasons.join("; ")
    };
    Score {
        confidence: total.clamp(0.0, MAX_CONFIDENCE),
        fired,
        rationale: format!("{}: {}", ctx.direction, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row() -> IndicatorRow {
        IndicatorRow {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 10, 15, 0).unwrap(),
            open: 104.0,
            high: 105.5,
            low: 103.5,
            close: 105.0,
            volume: 1000.0,
            ema_fast: 104.0,
            ema_mid: 102.0,
            ema_slow: 95.0,
            rsi: 64.0,
            atr: 1.5,
            macd: 1.2,
            macd_signal: 0.9,
            macd_hist: 0.3,
            bb_mid: 102.0,
            bb_upper: 106.0,
            bb_lower: 98.0,
            bb_width: 0.0784,
            vwap: 100.0,
            adx: 31.0,
            plus_di: 30.0,
            minus_di: 12.0,
            cmf: 0.2,
            swing_high: 105.5,
            swing_low: 90.0,
            fvg_up: true,
            fvg_down: false,
            eq_highs: false,
            eq_lows: false,
        }
    }

    fn bullish() -> StructureReading {
        StructureReading {
            trend: Trend::Bullish,
            higher_high: true,
            higher_low: true,
            lower_high: false,
            lower_low: false,
            breakout: true,
            character_change: false,
        }
    }

    fn bearish_row() -> IndicatorRow {
        IndicatorRow {
            close: 85.0,
            ema_fast: 86.0,
            ema_mid: 88.0,
            ema_slow: 95.0,
            rsi: 30.0,
            macd_hist: -0.4,
            cmf: -0.1,
            vwap: 90.0,
            fvg_up: false,
            fvg_down: true,
            ..row()
        }
    }

    fn bearish() -> StructureReading {
        StructureReading {
            trend: Trend::Bearish,
            higher_high: false,
            higher_low: false,
            lower_high: true,
            lower_low: true,
            ..bullish()
        }
    }

    #[test]
    fn long_selected_when_all_rules_hold() {
        let config = SignalConfig::default();
        assert_eq!(
            select_direction(&row(), &bullish(), &config),
            Some(Direction::Long)
        );
    }

    #[test]
    fn short_is_exact_mirror() {
        let config = SignalConfig::default();
        assert_eq!(
            select_direction(&bearish_row(), &bearish(), &config),
            Some(Direction::Short)
        );
    }

    #[test]
    fn any_failed_rule_blocks_direction() {
        let config = SignalConfig::default();
        let range = StructureReading {
            trend: Trend::Range,
            ..bullish()
        };
        assert_eq!(select_direction(&row(), &range, &config), None);

        let weak = IndicatorRow { adx: 10.0, ..row() };
        assert_eq!(select_direction(&weak, &bullish(), &config), None);

        let neutral_rsi = IndicatorRow { rsi: 50.0, ..row() };
        assert_eq!(select_direction(&neutral_rsi, &bullish(), &config), None);

        let tangled = IndicatorRow {
            ema_mid: 94.0,
            ..row()
        };
        assert_eq!(select_direction(&tangled, &bullish(), &config), None);

        let fading = IndicatorRow {
            macd_hist: 0.0,
            ..row()
        };
        assert_eq!(select_direction(&fading, &bullish(), &config), None);
    }

    fn context<'a>(
        row: &'a IndicatorRow,
        structure: &'a StructureReading,
        config: &'a SignalConfig,
    ) -> ScoringContext<'a> {
        ScoringContext {
            direction: Direction::Long,
            row,
            recent: std::slice::from_ref(row),
            structure,
            anchor: Some(103.5),
            config,
        }
    }

    #[test]
    fn every_factor_fires_on_ideal_long() {
        let (row, structure, config) = (row(), bullish(), SignalConfig::default());
        let ctx = context(&row, &structure, &config);
        for factor in FACTORS.iter() {
            assert!((factor.holds)(&ctx), "factor {} should hold", factor.name);
        }
        let score = score(&ctx);
        assert_eq!(score.confidence, MAX_CONFIDENCE);
        assert_eq!(score.fired.len(), FACTORS.len());
    }

    #[test]
    fn each_factor_can_fail_independently() {
        let config = SignalConfig::default();
        let structure = bullish();
        let cases: [(&str, IndicatorRow, StructureReading); 6] = [
            ("trend_alignment", IndicatorRow { ema_slow: 106.0, ..row() }, structure),
            (
                "breakout",
                row(),
                StructureReading {
                    character_change: true,
                    ..structure
                },
            ),
            ("liquidity_gap", IndicatorRow { fvg_up: false, ..row() }, structure),
            ("volatility", IndicatorRow { bb_width: 0.2, ..row() }, structure),
            ("strength", IndicatorRow { adx: 20.0, ..row() }, structure),
            ("volume_flow", IndicatorRow { cmf: -0.05, ..row() }, structure),
        ];
        for (name, r, s) in cases {
            let ctx = context(&r, &s, &config);
            let fired = score(&ctx).fired;
            assert!(!fired.contains(&name), "{name} should not fire");
            assert_eq!(fired.len(), FACTORS.len() - 1, "only {name} should drop");
        }

        let night = IndicatorRow {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 23, 0, 0).unwrap(),
            ..row()
        };
        assert!(!score(&context(&night, &structure, &config))
            .fired
            .contains(&"session"));

        let r = row();
        let far = ScoringContext {
            anchor: Some(50.0),
            ..context(&r, &structure, &config)
        };
        assert!(!score(&far).fired.contains(&"liquidity_pool"));
    }

    #[test]
    fn confidence_is_sum_of_fired_weights() {
        let config = SignalConfig::default();
        let structure = StructureReading {
            breakout: false,
            ..bullish()
        };
        let r = IndicatorRow {
            fvg_up: false,
            ..row()
        };
        let s = score(&context(&r, &structure, &config));
        assert_eq!(s.confidence, 100.0 - 12.0 - 8.0);
    }

    #[test]
    fn rationale_is_ordered_and_prefixed() {
        let (row, structure, config) = (row(), bullish(), SignalConfig::default());
        let s = score(&context(&row, &structure, &config));
        assert!(s.rationale.starts_with("LONG: bullish structure, close 105.00 above EMA200 95.00"));
        let breakout = s.rationale.find("clean breakout").unwrap();
        let session = s.rationale.find("active session hour 10 UTC").unwrap();
        assert!(breakout < session);
    }

    #[test]
    fn reduced_config_scores_trend_and_strength_only() {
        let (row, structure, config) = (row(), bullish(), SignalConfig::reduced());
        let s = score(&context(&row, &structure, &config));
        assert_eq!(s.confidence, 98.0);
        assert_eq!(s.fired, vec!["trend_alignment", "strength"]);
    }

    #[test]
    fn empty_rationale_falls_back() {
        let config = SignalConfig::default();
        let structure = StructureReading {
            trend: Trend::Range,
            breakout: false,
            ..bullish()
        };
        let r = IndicatorRow {
            ema_slow: 200.0,
            fvg_up: false,
            bb_width: 0.5,
            adx: 5.0,
            cmf: -1.0,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 2, 0, 0).unwrap(),
            ..row()
        };
        let ctx = ScoringContext {
            anchor: None,
            ..context(&r, &structure, &config)
        };
        let s = score(&ctx);
        assert_eq!(s.confidence, 0.0);
        assert_eq!(s.rationale, "LONG: direction rules satisfied");
    }

    #[test]
    fn session_window_wraps() {
        assert!(in_session(7, 7, 20));
        assert!(!in_session(20, 7, 20));
        assert!(in_session(23, 22, 3));
        assert!(in_session(1, 22, 3));
        assert!(!in_session(12, 22, 3));
        assert!(!in_session(5, 5, 5));
    }

    #[test]
    fn anchor_is_window_extreme() {
        let rows: Vec<IndicatorRow> = (0..20)
            .map(|i| IndicatorRow {
                low: 100.0 - i as f64,
                high: 110.0 + i as f64,
                ..row()
            })
            .collect();
        assert_eq!(liquidity_anchor(&rows, Direction::Long, 12), Some(81.0));
        assert_eq!(liquidity_anchor(&rows, Direction::Short, 12), Some(129.0));
        assert_eq!(liquidity_anchor(&rows[..3], Direction::Long, 12), Some(98.0));
        assert_eq!(liquidity_anchor(&[], Direction::Long, 12), None);
    }
}
