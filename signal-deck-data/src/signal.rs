//! Pure derivation functions turning raw feed records into display signals
//!
//! Everything here is stateless and referentially transparent; the UI calls
//! these per record on every render pass, nothing is cached.

use crate::types::{MacroRecord, Trend, TrendSet};
use derive_more::Display;

const WEIGHT_1W: i32 = 6;
const WEIGHT_3D: i32 = 3;
const WEIGHT_1D: i32 = 1;

/// Scores at or above this magnitude leave the neutral band
const BIAS_THRESHOLD: i32 = 3;

/// Weighted multi-timeframe trend score, -10..=+10
///
/// Longer timeframes dominate: 1w contributes ±6, 3d ±3, 1d ±1. Absent
/// timeframes contribute nothing.
pub fn trend_score(trends: &TrendSet) -> i32 {
    fn contribution(trend: Option<Trend>, weight: i32) -> i32 {
        match trend {
            Some(Trend::Uptrend) => weight,
            Some(Trend::Downtrend) => -weight,
            None => 0,
        }
    }

    contribution(trends.weekly, WEIGHT_1W)
        + contribution(trends.three_day, WEIGHT_3D)
        + contribution(trends.daily, WEIGHT_1D)
}

/// Display classification of a trend score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBias {
    Positive,
    Neutral,
    Negative,
}

/// Classify a trend score for display
///
/// Scores inside the open band (-3, 3) render neutral even though they are
/// non-zero; a lone 1d trend never moves the arrow.
pub fn score_bias(score: i32) -> ScoreBias {
    if score >= BIAS_THRESHOLD {
        ScoreBias::Positive
    } else if score <= -BIAS_THRESHOLD {
        ScoreBias::Negative
    } else {
        ScoreBias::Neutral
    }
}

/// Format a minutes-ago value as a compact recency label
///
/// Exact unit boundaries round into the coarser unit: 60 minutes renders
/// as "1h ago", 1440 as "1d ago".
pub fn format_recency(minutes_ago: Option<u32>) -> String {
    let Some(minutes) = minutes_ago else {
        return "Never".to_string();
    };
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Aggregate market call derived from all macro records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Verdict {
    #[display("BULLISH")]
    Bullish,
    #[display("BEARISH")]
    Bearish,
    #[display("LOADING")]
    Loading,
}

/// Vote tally behind a [`Verdict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketVerdict {
    pub verdict: Verdict,
    pub bullish: u32,
    pub bearish: u32,
    pub total: u32,
    /// Share of the winning side, rounded integer percent
    pub confidence: u8,
}

/// Aggregate the macro records into a market-wide verdict
///
/// Each record casts two binary votes (monthly trend, monthly MACD); there
/// is no abstain. A tie resolves BEARISH, not neutral.
pub fn market_verdict(macros: &[MacroRecord]) -> MarketVerdict {
    let mut bullish = 0u32;
    let mut bearish = 0u32;

    for record in macros {
        for bias in [record.monthly_trend, record.monthly_macd] {
            if bias.is_bullish() {
                bullish += 1;
            } else {
                bearish += 1;
            }
        }
    }

    let total = bullish + bearish;
    if total == 0 {
        return MarketVerdict {
            verdict: Verdict::Loading,
            bullish: 0,
            bearish: 0,
            total: 0,
            confidence: 0,
        };
    }

    let verdict = if bullish > bearish {
        Verdict::Bullish
    } else {
        Verdict::Bearish
    };
    let confidence = (f64::from(bullish.max(bearish)) / f64::from(total) * 100.0).round() as u8;

    MarketVerdict {
        verdict,
        bullish,
        bearish,
        total,
        confidence,
    }
}

/// Whether a record changed less than a minute ago (highlight styling)
pub fn is_recent(last_updated_minutes_ago: Option<u32>) -> bool {
    matches!(last_updated_minutes_ago, Some(minutes) if minutes < 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MacroBias;

    fn trends(weekly: Option<Trend>, three_day: Option<Trend>, daily: Option<Trend>) -> TrendSet {
        TrendSet {
            weekly,
            three_day,
            daily,
        }
    }

    fn macro_record(trend: MacroBias, macd: MacroBias) -> MacroRecord {
        MacroRecord {
            symbol: "BTC".to_string(),
            display_name: "Bitcoin".to_string(),
            monthly_trend: trend,
            monthly_macd: macd,
            last_updated_minutes_ago: Some(1),
        }
    }

    #[test]
    fn test_trend_score_single_timeframe() {
        let up = Some(Trend::Uptrend);

        assert_eq!(trend_score(&trends(None, None, up)), 1);
        assert_eq!(trend_score(&trends(None, up, None)), 3);
        assert_eq!(trend_score(&trends(up, None, None)), 6);
    }

    #[test]
    fn test_trend_score_mixed() {
        let set = trends(
            Some(Trend::Downtrend),
            Some(Trend::Uptrend),
            Some(Trend::Downtrend),
        );
        assert_eq!(trend_score(&set), -4);
        assert_eq!(score_bias(-4), ScoreBias::Negative);
    }

    #[test]
    fn test_score_bias_neutral_band() {
        // A lone 1d trend scores ±1 and stays neutral
        assert_eq!(score_bias(1), ScoreBias::Neutral);
        assert_eq!(score_bias(-2), ScoreBias::Neutral);
        assert_eq!(score_bias(3), ScoreBias::Positive);
        assert_eq!(score_bias(-3), ScoreBias::Negative);
        assert_eq!(score_bias(10), ScoreBias::Positive);
    }

    #[test]
    fn test_format_recency_buckets() {
        assert_eq!(format_recency(None), "Never");
        assert_eq!(format_recency(Some(0)), "Just now");
        assert_eq!(format_recency(Some(59)), "59m ago");
        assert_eq!(format_recency(Some(60)), "1h ago");
        assert_eq!(format_recency(Some(1439)), "23h ago");
        assert_eq!(format_recency(Some(1440)), "1d ago");
        assert_eq!(format_recency(Some(3 * 1440 + 10)), "3d ago");
    }

    #[test]
    fn test_market_verdict_empty() {
        let verdict = market_verdict(&[]);
        assert_eq!(
            verdict,
            MarketVerdict {
                verdict: Verdict::Loading,
                bullish: 0,
                bearish: 0,
                total: 0,
                confidence: 0,
            }
        );
    }

    #[test]
    fn test_market_verdict_unanimous() {
        let records = vec![
            macro_record(MacroBias::Bullish, MacroBias::Bullish),
            macro_record(MacroBias::Bullish, MacroBias::Bullish),
        ];
        let verdict = market_verdict(&records);

        assert_eq!(verdict.verdict, Verdict::Bullish);
        assert_eq!(verdict.bullish, 4);
        assert_eq!(verdict.bearish, 0);
        assert_eq!(verdict.total, 4);
        assert_eq!(verdict.confidence, 100);
    }

    #[test]
    fn test_market_verdict_tie_resolves_bearish() {
        let records = vec![macro_record(MacroBias::Bullish, MacroBias::Bearish)];
        let verdict = market_verdict(&records);

        assert_eq!(verdict.verdict, Verdict::Bearish);
        assert_eq!(verdict.bullish, 1);
        assert_eq!(verdict.bearish, 1);
        assert_eq!(verdict.total, 2);
        assert_eq!(verdict.confidence, 50);
    }

    #[test]
    fn test_is_recent() {
        assert!(is_recent(Some(0)));
        assert!(!is_recent(Some(1)));
        assert!(!is_recent(None));
    }
}
